//! Bracket-style form decoding
//!
//! Browsers submit nested fields as flat `application/x-www-form-urlencoded`
//! pairs whose names carry the structure: `page[title]=Home`,
//! `part[2][name]=body`, `pages[]=4`. [`FormValue::parse`] rebuilds the tree.
//!
//! Rules:
//! - `a[b][c]` nests maps; an empty segment (`a[]`) appends under the next
//!   free integer key.
//! - A later pair overwrites an earlier one with the same full name.
//! - Map entries keep their first-insertion order.
//! - A name with an unbalanced `[` is used literally as a single key.
//! - Names nest at most [`MAX_DEPTH`] levels below the top-level key.

/// Deepest bracket nesting accepted in a field name
pub const MAX_DEPTH: usize = 64;

/// Error while decoding a form body
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Malformed form body: {0}")]
    Decode(#[from] serde_urlencoded::de::Error),

    #[error("Field name nests deeper than {MAX_DEPTH} levels")]
    TooDeep,

    #[error("No index left to append to")]
    IndexOverflow,
}

/// A decoded form node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    Map(Vec<(String, FormValue)>),
}

impl Default for FormValue {
    fn default() -> Self {
        FormValue::Map(Vec::new())
    }
}

impl FormValue {
    /// Decode an urlencoded body into a tree rooted at a map
    pub fn parse(body: &str) -> Result<Self, FormError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body)?;
        Self::from_pairs(pairs)
    }

    /// Build a tree from already-decoded pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, FormError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut root = FormValue::default();
        for (name, value) in pairs {
            let segments = split_name(name.as_ref())?;
            root.insert(&segments, value.into())?;
        }
        Ok(root)
    }

    fn insert(&mut self, segments: &[String], value: String) -> Result<(), FormError> {
        let Some((leaf, path)) = segments.split_last() else {
            return Ok(());
        };

        let mut node = self;
        for segment in path {
            let entries = node.as_map_mut();
            let key = entry_key(entries, segment)?;
            let position = match entries.iter().position(|(k, _)| *k == key) {
                Some(position) => position,
                None => {
                    entries.push((key, FormValue::default()));
                    entries.len() - 1
                }
            };
            node = &mut entries[position].1;
        }

        let entries = node.as_map_mut();
        let key = entry_key(entries, leaf)?;
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = FormValue::Text(value),
            None => entries.push((key, FormValue::Text(value))),
        }
        Ok(())
    }

    /// Borrow the entries, turning a text node into an empty map first
    fn as_map_mut(&mut self) -> &mut Vec<(String, FormValue)> {
        if let FormValue::Text(_) = self {
            *self = FormValue::default();
        }
        match self {
            FormValue::Map(entries) => entries,
            FormValue::Text(_) => unreachable!("text node replaced above"),
        }
    }

    /// Child node by key
    pub fn get(&self, key: &str) -> Option<&FormValue> {
        match self {
            FormValue::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            FormValue::Text(_) => None,
        }
    }

    /// Text of a direct child
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FormValue::as_text)
    }

    /// Text of a node
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            FormValue::Map(_) => None,
        }
    }

    /// Map entries in submission order (empty for text nodes)
    pub fn entries(&self) -> &[(String, FormValue)] {
        match self {
            FormValue::Map(entries) => entries,
            FormValue::Text(_) => &[],
        }
    }

    /// Whether a direct child exists at all
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Split `a[b][]` into `["a", "b", ""]`
fn split_name(name: &str) -> Result<Vec<String>, FormError> {
    let Some(open) = name.find('[') else {
        return Ok(vec![name.to_string()]);
    };
    if open == 0 {
        return Ok(vec![name.to_string()]);
    }

    let mut segments = vec![name[..open].to_string()];
    let mut rest = &name[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        match stripped.find(']') {
            Some(close) => {
                if segments.len() > MAX_DEPTH {
                    return Err(FormError::TooDeep);
                }
                segments.push(stripped[..close].to_string());
                rest = &stripped[close + 1..];
            }
            None => return Ok(vec![name.to_string()]),
        }
    }
    // Trailing text after the last `]` is ignored.
    Ok(segments)
}

/// Key for one segment; an empty segment takes the next free index
fn entry_key(entries: &[(String, FormValue)], segment: &str) -> Result<String, FormError> {
    if segment.is_empty() {
        next_index(entries).map(|index| index.to_string())
    } else {
        Ok(segment.to_string())
    }
}

/// Next free integer key for `name[]`, one past the largest numeric key
fn next_index(entries: &[(String, FormValue)]) -> Result<u64, FormError> {
    match entries.iter().filter_map(|(k, _)| k.parse::<u64>().ok()).max() {
        None => Ok(0),
        Some(max) => max.checked_add(1).ok_or(FormError::IndexOverflow),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_page_fields() {
        let form = FormValue::parse(
            "page%5Btitle%5D=Home&page%5Bslug%5D=home&part%5B1%5D%5Bname%5D=body&commit=Save",
        )
        .unwrap();

        let page = form.get("page").unwrap();
        assert_eq!(page.text("title"), Some("Home"));
        assert_eq!(page.text("slug"), Some("home"));
        assert_eq!(
            form.get("part")
                .and_then(|p| p.get("1"))
                .and_then(|p| p.text("name")),
            Some("body")
        );
        assert!(form.contains("commit"));
    }

    #[test]
    fn test_append_segments_get_sequential_keys() {
        let form = FormValue::parse("pages[]=4&pages[]=9&pages[]=2").unwrap();
        let keys: Vec<(&str, &str)> = form
            .get("pages")
            .unwrap()
            .entries()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_text().unwrap()))
            .collect();
        assert_eq!(keys, vec![("0", "4"), ("1", "9"), ("2", "2")]);
    }

    #[test]
    fn test_append_after_explicit_index() {
        let form = FormValue::from_pairs([("x[5]", "a"), ("x[]", "b")]).unwrap();
        let x = form.get("x").unwrap();
        assert_eq!(x.text("5"), Some("a"));
        assert_eq!(x.text("6"), Some("b"));
    }

    #[test]
    fn test_later_value_overwrites() {
        let form = FormValue::from_pairs([("a", "1"), ("b", "x"), ("a", "2")]).unwrap();
        assert_eq!(form.text("a"), Some("2"));
        assert_eq!(form.entries().len(), 2);
    }

    #[test]
    fn test_unbalanced_name_is_literal() {
        let form = FormValue::from_pairs([("a[b", "1"), ("[c]", "2")]).unwrap();
        assert_eq!(form.text("a[b"), Some("1"));
        assert_eq!(form.text("[c]"), Some("2"));
    }

    #[test]
    fn test_text_replaced_by_map() {
        let form = FormValue::from_pairs([("a", "flat"), ("a[b]", "nested")]).unwrap();
        assert_eq!(form.get("a").unwrap().text("b"), Some("nested"));
    }

    #[test]
    fn test_plus_decodes_to_space() {
        let form = FormValue::parse("page%5Btitle%5D=About+us").unwrap();
        assert_eq!(form.get("page").unwrap().text("title"), Some("About us"));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let body = format!("a{}=1", "%5B%5D".repeat(200_000));
        assert!(matches!(FormValue::parse(&body), Err(FormError::TooDeep)));
    }

    #[test]
    fn test_nesting_up_to_limit_is_accepted() {
        let name = format!("a{}", "[k]".repeat(MAX_DEPTH));
        let form = FormValue::from_pairs([(name.as_str(), "leaf")]).unwrap();

        let mut node = form.get("a").unwrap();
        for _ in 1..MAX_DEPTH {
            node = node.get("k").unwrap();
        }
        assert_eq!(node.text("k"), Some("leaf"));

        let too_deep = format!("a{}", "[k]".repeat(MAX_DEPTH + 1));
        assert!(matches!(
            FormValue::from_pairs([(too_deep.as_str(), "leaf")]),
            Err(FormError::TooDeep)
        ));
    }

    #[test]
    fn test_append_after_largest_index_fails() {
        let result = FormValue::parse("pages%5B18446744073709551615%5D=3&pages%5B%5D=4");
        assert!(matches!(result, Err(FormError::IndexOverflow)));
    }

    #[test]
    fn test_largest_explicit_index_is_kept() {
        let form = FormValue::parse("pages%5B18446744073709551615%5D=3&pages%5B0%5D=4").unwrap();
        let pages = form.get("pages").unwrap();
        assert_eq!(pages.text("18446744073709551615"), Some("3"));
        assert_eq!(pages.text("0"), Some("4"));
    }
}
