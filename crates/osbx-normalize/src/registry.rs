use std::collections::BTreeMap;

/// Built-in resource-type tokens and the extension each one is renamed to.
pub const DEFAULT_EXTENSIONS: &[(&str, &str)] = &[
    ("BusinessService", "bix"),
    ("ProxyService", "proxy"),
    ("Pipeline", "pipeline"),
    ("XML", "xml"),
    ("XMLSchema", "xsd"),
    ("Xquery", "xqy"),
    ("XSLT", "xsl"),
    ("MFL", "mfl"),
    ("WADL", "wadl"),
    ("WSDL", "wsdl"),
    ("ServiceAccount", "sa"),
    ("Archive", "jar"),
    ("JCA", "jca"),
];

/// Immutable mapping from a case-sensitive resource-type token (the suffix
/// after the last `.` of an exported file name) to a file extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionRegistry {
    map: BTreeMap<String, String>,
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_EXTENSIONS.iter().copied())
    }
}

impl ExtensionRegistry {
    /// Build a registry from `(token, extension)` pairs. A later pair wins
    /// over an earlier one with the same token; leading dots on extensions
    /// are dropped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let map = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.as_ref().trim_start_matches('.').to_string()))
            .collect();
        Self { map }
    }

    /// The built-in table with `overrides` merged over it.
    pub fn with_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut registry = Self::default();
        registry.map.extend(Self::from_pairs(overrides).map);
        registry
    }

    pub fn destination(&self, token: &str) -> Option<&str> {
        self.map.get(token).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.map.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table() {
        let registry = ExtensionRegistry::default();
        assert_eq!(registry.len(), DEFAULT_EXTENSIONS.len());
        assert_eq!(registry.destination("BusinessService"), Some("bix"));
        assert_eq!(registry.destination("Xquery"), Some("xqy"));
        assert_eq!(registry.destination("JCA"), Some("jca"));
    }

    #[test]
    fn tokens_are_case_sensitive() {
        let registry = ExtensionRegistry::default();
        assert!(registry.contains("XML"));
        assert!(!registry.contains("xml"));
        assert!(!registry.contains("xquery"));
    }

    #[test]
    fn overrides_replace_and_extend() {
        let registry =
            ExtensionRegistry::with_overrides([("BusinessService", "biz"), ("Alert", ".alert")]);
        assert_eq!(registry.destination("BusinessService"), Some("biz"));
        assert_eq!(registry.destination("Alert"), Some("alert"));
        assert_eq!(registry.destination("WSDL"), Some("wsdl"));
        assert_eq!(registry.len(), DEFAULT_EXTENSIONS.len() + 1);
    }

    #[test]
    fn custom_registry_has_only_its_pairs() {
        let registry = ExtensionRegistry::from_pairs([("Foo", "foo")]);
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec![("Foo", "foo")]);
        assert!(!registry.contains("XML"));
    }
}
