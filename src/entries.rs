/// Input that ends collection of list items. Compared exactly, no trimming.
pub const SENTINEL: &str = "x";

/// What a single line typed while collecting items means
#[derive(Debug, PartialEq, Eq)]
pub enum Entry {
    Finished,
    Items(Vec<String>),
}

impl From<&str> for Entry {
    fn from(line: &str) -> Self {
        if line == SENTINEL {
            Self::Finished
        } else if line.contains(',') {
            Self::Items(split_trimmed(line))
        } else {
            Self::Items(vec![line.trim().to_string()])
        }
    }
}

/// Splits on commas and trims each piece. Empty pieces are kept.
pub fn split_trimmed(line: &str) -> Vec<String> {
    line.split(',').map(|piece| piece.trim().to_string()).collect()
}

pub fn parse_recipients(line: &str) -> Vec<String> {
    split_trimmed(line)
}

/// Checks user confirmation, anything other than "yes" (any case) is a no
pub fn is_yes(answer: &str) -> bool {
    answer.to_lowercase() == "yes"
}
