use std::fmt::{Display, Formatter};

/// Top-level split of every artifact: collision data or simulation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Category {
    Data,
    Mc,
}

impl Category {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Data => "Data",
            Category::Mc => "MC",
        }
    }

    /// Exact, case-sensitive match on the key prefix.
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "Data" => Some(Category::Data),
            "MC" => Some(Category::Mc),
            _ => None,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
