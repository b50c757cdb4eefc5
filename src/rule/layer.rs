use std::fmt;

/// Component layers, from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Atoms,
    Molecules,
    Organisms,
    Templates,
    Pages,
}

impl Layer {
    pub const ALL: &'static [Layer] = &[
        Layer::Atoms,
        Layer::Molecules,
        Layer::Organisms,
        Layer::Templates,
        Layer::Pages,
    ];

    /// Directory name of the layer under the components root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Layer::Atoms => "Atoms",
            Layer::Molecules => "Molecules",
            Layer::Organisms => "Organisms",
            Layer::Templates => "Templates",
            Layer::Pages => "Pages",
        }
    }

    /// Layers this layer must not import from
    pub fn above(&self) -> &'static [Layer] {
        let index = Self::ALL.iter().position(|l| l == self).unwrap_or(0);
        &Self::ALL[index + 1..]
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_above() {
        assert_eq!(
            Layer::Organisms.above(),
            &[Layer::Templates, Layer::Pages]
        );
        assert!(Layer::Pages.above().is_empty());
        assert_eq!(Layer::Atoms.above().len(), 4);
    }

    #[test]
    fn test_above_outlives_caller() {
        let above: Vec<&'static [Layer]> = Layer::ALL.iter().map(|l| l.above()).collect();
        assert_eq!(above.iter().map(|a| a.len()).collect::<Vec<_>>(), vec![4, 3, 2, 1, 0]);
        assert_eq!(above[3], &[Layer::Pages]);
    }

    #[test]
    fn test_ordering() {
        assert!(Layer::Atoms < Layer::Pages);
        assert_eq!(Layer::Molecules.to_string(), "Molecules");
    }
}
