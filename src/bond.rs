/// Default edge type for a molecule graph.
///
/// The endpoints live on the graph edge; the bond itself only carries its
/// multiplicity (1 = single, 2 = double, 3 = triple).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub multiplicity: u8,
}

impl Bond {
    pub fn new(multiplicity: u8) -> Self {
        Self { multiplicity }
    }
}

impl Default for Bond {
    fn default() -> Self {
        Self { multiplicity: 1 }
    }
}

impl crate::traits::HasMultiplicity for Bond {
    fn multiplicity(&self) -> u8 {
        self.multiplicity
    }
}
