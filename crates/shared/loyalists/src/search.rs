use crate::dataset::Dataset;
use crate::directory::Directory;

pub fn is_blank_query(query: &str) -> bool {
    query.trim().is_empty()
}

/// Dataset filtered by a search query.
///
/// Keeps one (possibly empty) entry per generation so indices still line up with
/// the base dataset, and preserves the original order inside each generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilteredLoyalists {
    generations: Vec<Vec<String>>,
}

impl FilteredLoyalists {
    /// Case-insensitive substring match against username or display name.
    /// A blank query keeps everyone.
    pub fn new(dataset: &Dataset, directory: &Directory, query: &str) -> Self {
        let needle = query.trim().to_lowercase();
        let generations = dataset
            .generations()
            .iter()
            .map(|members| {
                members
                    .iter()
                    .filter(|u| matches(u, directory, &needle))
                    .cloned()
                    .collect()
            })
            .collect();
        Self { generations }
    }

    /// Members of a 1-based generation that survived the filter.
    pub fn generation(&self, generation: usize) -> &[String] {
        generation
            .checked_sub(1)
            .and_then(|idx| self.generations.get(idx))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `(generation, members)` for generations with at least one match.
    pub fn non_empty(&self) -> impl Iterator<Item = (usize, &[String])> + '_ {
        self.generations
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_empty())
            .map(|(idx, m)| (idx + 1, m.as_slice()))
    }

    /// First match in generation order.
    pub fn first_match(&self) -> Option<(usize, &str)> {
        self.non_empty()
            .next()
            .and_then(|(generation, members)| members.first().map(|u| (generation, u.as_str())))
    }

    pub fn match_count(&self) -> usize {
        self.generations.iter().map(Vec::len).sum()
    }
}

fn matches(username: &str, directory: &Directory, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    if username.to_lowercase().contains(needle) {
        return true;
    }
    directory
        .explicit_display_name(username)
        .map(|name| name.to_lowercase().contains(needle))
        .unwrap_or(false)
}
