//! Legend: ordered (symbol, label) pairs for one data layer.

use std::rc::Rc;

use crate::symbol::Symbol;

/// A fixed-size, ordered collection of symbol references with one label.
///
/// Entries hold `Rc<Symbol>` so one symbol instance can appear in several
/// slots. The engine is single-threaded by contract, so `Rc` suffices.
#[derive(Clone, Debug, Default)]
pub struct Legend {
    label: String,
    symbols: Vec<Option<Rc<Symbol>>>,
}

impl Legend {
    pub fn new(label: impl Into<String>, size: usize) -> Self {
        Legend {
            label: label.into(),
            symbols: vec![None; size],
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Store a symbol reference in slot `i`; out of bounds is a no-op.
    pub fn set_symbol(&mut self, i: usize, symbol: Rc<Symbol>) {
        if let Some(slot) = self.symbols.get_mut(i) {
            *slot = Some(symbol);
        }
    }

    pub fn symbol(&self, i: usize) -> Option<&Rc<Symbol>> {
        self.symbols.get(i).and_then(|s| s.as_ref())
    }

    /// Grow or shrink the slot array, keeping existing entries where they
    /// still fit.
    pub fn resize(&mut self, size: usize) {
        self.symbols.resize(size, None);
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&Rc<Symbol>>> {
        self.symbols.iter().map(|s| s.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{SymbolKind, SymbolStyle};

    #[test]
    fn same_symbol_in_multiple_slots() {
        let sym = Rc::new(Symbol::new(SymbolKind::Point, SymbolStyle::CircleFilled));
        let mut legend = Legend::new("Observed flow", 3);
        legend.set_symbol(0, Rc::clone(&sym));
        legend.set_symbol(2, Rc::clone(&sym));

        assert!(Rc::ptr_eq(legend.symbol(0).unwrap(), legend.symbol(2).unwrap()));
        assert!(legend.symbol(1).is_none());
    }

    #[test]
    fn out_of_bounds_slot_is_a_noop() {
        let sym = Rc::new(Symbol::new(SymbolKind::Line, SymbolStyle::None));
        let mut legend = Legend::new("Stage", 1);
        legend.set_symbol(5, sym);
        assert!(legend.symbol(5).is_none());
        assert_eq!(legend.len(), 1);
    }

    #[test]
    fn resize_keeps_fitting_entries() {
        let sym = Rc::new(Symbol::new(SymbolKind::Point, SymbolStyle::Plus));
        let mut legend = Legend::new("Rainfall", 2);
        legend.set_symbol(0, sym);
        legend.resize(4);
        assert_eq!(legend.len(), 4);
        assert!(legend.symbol(0).is_some());
        legend.resize(1);
        assert!(legend.symbol(0).is_some());
        assert_eq!(legend.len(), 1);
    }
}
