//! `%name%` placeholder substitution.

type Supplier<'a> = Box<dyn Fn() -> String + 'a>;

/// Ordered name → value mapping. Later entries win, and suppliers are only
/// called for tokens that actually occur in the template.
#[derive(Default)]
pub struct MappedPlaceholder<'a> {
    entries: Vec<(String, Supplier<'a>)>,
}

impl<'a> MappedPlaceholder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every name in `keys` to `supplier`.
    pub fn map<F>(&mut self, keys: &[&str], supplier: F) -> &mut Self
    where
        F: Fn() -> String + Clone + 'a,
    {
        for key in keys {
            self.entries
                .push((key.to_ascii_lowercase(), Box::new(supplier.clone())));
        }
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        self.map(&[key], move || value.clone())
    }

    /// Copy static definitions, e.g. the configured placeholders.
    pub fn inherit<'m>(&mut self, definitions: impl IntoIterator<Item = (&'m String, &'m String)>) {
        for (key, value) in definitions {
            self.insert(key, value.as_str());
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, supplier)| supplier())
    }

    /// Replace known `%name%` tokens in one pass. Unknown tokens and stray
    /// `%` are left as written; substituted values are not rescanned.
    pub fn update(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('%') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let resolved = after.find('%').and_then(|end| {
                let key = &after[..end];
                let valid = !key.is_empty() && !key.contains(char::is_whitespace);
                valid
                    .then(|| self.get(key))
                    .flatten()
                    .map(|value| (value, end))
            });

            match resolved {
                Some((value, end)) => {
                    out.push_str(&value);
                    rest = &after[end + 1..];
                },
                None => {
                    out.push('%');
                    rest = after;
                },
            }
        }

        out.push_str(rest);
        out
    }
}
