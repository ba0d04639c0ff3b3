//! Build environment snapshot and `${VAR}` placeholder expansion.

use std::collections::HashMap;

/// Variables visible to the current build.
#[derive(Debug, Clone, Default)]
pub struct BuildEnv {
    vars: HashMap<String, String>,
}

impl BuildEnv {
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(|s| s.as_str())
    }

    /// Replaces `${NAME}` and `$NAME` with their values.
    ///
    /// Unknown names stay in the output verbatim and `$$` collapses to `$`.
    pub fn expand(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos + 1..];

            if let Some(after) = tail.strip_prefix('$') {
                out.push('$');
                rest = after;
                continue;
            }

            if let Some(braced) = tail.strip_prefix('{')
                && let Some(end) = braced.find('}')
            {
                let name = &braced[..end];
                match self.lookup(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[pos..pos + end + 3]),
                }
                rest = &braced[end + 1..];
                continue;
            }

            let name_len = name_length(tail);
            if name_len == 0 {
                out.push('$');
                rest = tail;
                continue;
            }
            let name = &tail[..name_len];
            match self.lookup(name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push('$');
                    out.push_str(name);
                }
            }
            rest = &tail[name_len..];
        }
        out.push_str(rest);
        out
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        if name_length(name) != name.len() || name.is_empty() {
            return None;
        }
        self.get(name)
    }
}

fn name_length(s: &str) -> usize {
    let mut len = 0;
    for (i, c) in s.char_indices() {
        let valid = if i == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };
        if !valid {
            break;
        }
        len = i + c.len_utf8();
    }
    len
}
