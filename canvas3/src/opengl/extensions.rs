use crate::util::typedefs::FastHashSet;

pub const ARB_MULTISAMPLE: &str = "GL_ARB_multisample";
pub const NV_MULTISAMPLE_FILTER_HINT: &str = "GL_NV_multisample_filter_hint";

/// Which extensions the context supports.
#[derive(Debug, Default, Clone)]
pub struct ExtensionManager {
    names: Vec<String>,
    lookup: FastHashSet<String>,
}

impl ExtensionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the known extensions with the space separated `list`.
    pub fn initialize(&mut self, list: &str) {
        self.names.clear();
        self.lookup.clear();
        for name in list.split_whitespace() {
            if self.lookup.insert(name.to_owned()) {
                self.names.push(name.to_owned());
            }
        }
        log::debug!("{} OpenGL extensions available", self.names.len());
    }

    pub fn has(&self, name: &str) -> bool {
        self.lookup.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Extension names in the order the context reported them.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn reset(&mut self) {
        self.names.clear();
        self.lookup.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list() {
        let mut ext = ExtensionManager::new();
        ext.initialize("GL_ARB_multisample  GL_EXT_foo\nGL_ARB_multisample");
        assert_eq!(ext.len(), 2);
        assert!(ext.has(ARB_MULTISAMPLE));
        assert!(!ext.has(NV_MULTISAMPLE_FILTER_HINT));
        assert_eq!(ext.iter().collect::<Vec<_>>(), ["GL_ARB_multisample", "GL_EXT_foo"]);
        ext.reset();
        assert!(ext.is_empty());
    }
}
