use hashbrown::HashMap;

/// Username -> display name and username -> avatar reference.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    display_names: HashMap<String, String>,
    avatars: HashMap<String, String>,
}

impl Directory {
    pub fn new(display_names: HashMap<String, String>, avatars: HashMap<String, String>) -> Self {
        Self {
            display_names,
            avatars,
        }
    }

    /// Display name, falling back to the username itself.
    pub fn display_name<'a>(&'a self, username: &'a str) -> &'a str {
        self.display_names
            .get(username)
            .map(String::as_str)
            .unwrap_or(username)
    }

    /// Display name only when one was provided.
    pub fn explicit_display_name(&self, username: &str) -> Option<&str> {
        self.display_names.get(username).map(String::as_str)
    }

    pub fn avatar(&self, username: &str) -> Option<&str> {
        self.avatars.get(username).map(String::as_str)
    }

    pub fn display_names(&self) -> &HashMap<String, String> {
        &self.display_names
    }

    pub fn avatars(&self) -> &HashMap<String, String> {
        &self.avatars
    }
}
