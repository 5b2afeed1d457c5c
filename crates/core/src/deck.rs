use crate::{Card, CategoryId, FilterSet, RngState};

/// Filtered, shuffled, cyclic ordering over a card collection.
///
/// The view holds indices into `cards` and is rebuilt wholesale on every
/// filter or collection change, which also resets the cursor. Between
/// rebuilds only the cursor moves, so `len()` advances visit every card once.
#[derive(Debug, Clone)]
pub struct DeckSequencer {
    cards: Vec<Card>,
    filters: FilterSet,
    player_limit: Option<u32>,
    view: Vec<usize>,
    cursor: usize,
    rng: RngState,
}

impl DeckSequencer {
    pub fn new(rng: RngState) -> Self {
        Self {
            cards: Vec::new(),
            filters: FilterSet::new(),
            player_limit: None,
            view: Vec::new(),
            cursor: 0,
            rng,
        }
    }

    pub fn with_cards(cards: Vec<Card>, rng: RngState) -> Self {
        let mut deck = Self::new(rng);
        deck.set_cards(cards);
        deck
    }

    pub fn set_cards(&mut self, cards: Vec<Card>) {
        self.cards = cards;
        self.rebuild();
    }

    pub fn set_filter(&mut self, id: CategoryId, selected: bool) {
        self.filters.set(id, selected);
        self.rebuild();
    }

    /// Flips one category and returns its new selection.
    pub fn toggle(&mut self, id: CategoryId) -> bool {
        let selected = self.filters.toggle(id);
        self.rebuild();
        selected
    }

    pub fn replace_filters(&mut self, filters: FilterSet) {
        self.filters = filters;
        self.rebuild();
    }

    /// Excludes cards that need more players than `limit`. `None` lifts the restriction.
    pub fn set_player_limit(&mut self, limit: Option<u32>) {
        self.player_limit = limit;
        self.rebuild();
    }

    pub fn current(&self) -> Option<&Card> {
        if self.view.is_empty() {
            return None;
        }
        let index = self.view[self.cursor % self.view.len()];
        self.cards.get(index)
    }

    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor position within the current view, if any card is active.
    pub fn position(&self) -> Option<usize> {
        if self.view.is_empty() {
            None
        } else {
            Some(self.cursor % self.view.len())
        }
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn player_limit(&self) -> Option<u32> {
        self.player_limit
    }

    /// Cards of the current view in traversal order, starting at view index 0.
    pub fn view(&self) -> impl Iterator<Item = &Card> + '_ {
        self.view.iter().filter_map(|index| self.cards.get(*index))
    }

    fn rebuild(&mut self) {
        let filters = &self.filters;
        let limit = self.player_limit;
        let mut view: Vec<usize> = self
            .cards
            .iter()
            .enumerate()
            .filter(|(_, card)| filters.is_selected(card.category_id))
            .filter(|(_, card)| limit.map_or(true, |players| card.min_players() <= players))
            .map(|(index, _)| index)
            .collect();
        self.rng.shuffle(&mut view);
        self.view = view;
        self.cursor = 0;
    }
}
