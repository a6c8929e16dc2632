//! Subfield parsing and unparsing.
//!
//! ISIS field values embed labelled substrings: a delimiter byte (`^` by
//! convention) followed by a single key byte starts a new subfield, and the
//! text before the first delimiter is the "prefix", keyed `_`. For example
//! `b"data^ttext^len"` splits into `_`=`data`, `t`=`text`, `l`=`en`.
//!
//! Splitting and joining are exact inverses for every byte string: a
//! delimiter that is the last byte of a field (with no key byte after it)
//! belongs to the preceding value rather than starting an empty subfield,
//! and empty-valued subfields are kept.

use crate::error::{IsisError, Result};
use regex::bytes::Regex;
use smallvec::SmallVec;

/// Default subfield delimiter byte.
pub const DEFAULT_PREFIX: u8 = b'^';
/// Default key for the leading keyless value.
pub const DEFAULT_FIRST_KEY: u8 = b'_';

/// Ordered subfield pairs of one field value.
pub type SubfieldPairs = SmallVec<[(u8, Vec<u8>); 4]>;

/// Splits field values into subfield pairs and joins them back.
#[derive(Debug, Clone)]
pub struct SubfieldParser {
    prefix: u8,
    first: u8,
    lowercase: bool,
    check: bool,
    delimiter: Regex,
}

impl SubfieldParser {
    /// Create a parser for the given delimiter byte.
    #[must_use]
    pub fn new(prefix: u8) -> Self {
        // `(?s-u)` so the key position matches any single byte.
        let delimiter = Regex::new(&format!(r"(?s-u)\x{prefix:02x}."))
            .unwrap_or_else(|_| unreachable!("fixed-shape pattern"));
        SubfieldParser {
            prefix,
            first: DEFAULT_FIRST_KEY,
            lowercase: false,
            check: true,
            delimiter,
        }
    }

    /// Replace the key used for the leading keyless value.
    #[must_use]
    pub fn with_first_key(mut self, first: u8) -> Self {
        self.first = first;
        self
    }

    /// Fold subfield keys to ASCII lower case, making them
    /// case-insensitive.
    #[must_use]
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Control whether [`SubfieldParser::unparse`] verifies that the joined
    /// field re-parses to the same pairs (on by default).
    #[must_use]
    pub fn with_check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    /// Key assigned to the leading keyless value.
    #[must_use]
    pub fn first_key(&self) -> u8 {
        self.first
    }

    /// Split a field value into ordered `(key, value)` pairs.
    ///
    /// The prefix pair is emitted only when the leading text is non-empty;
    /// all other pairs are kept even when their value is empty.
    #[must_use]
    pub fn parse(&self, field: &[u8]) -> SubfieldPairs {
        let marks: Vec<(usize, usize)> = self
            .delimiter
            .find_iter(field)
            .map(|found| (found.start(), found.end()))
            .collect();

        let mut pairs = SubfieldPairs::new();
        let prefix_end = marks.first().map_or(field.len(), |&(start, _)| start);
        if prefix_end > 0 {
            pairs.push((self.first, field[..prefix_end].to_vec()));
        }
        for (idx, &(start, end)) in marks.iter().enumerate() {
            let mut key = field[start + 1];
            if self.lowercase {
                key = key.to_ascii_lowercase();
            }
            let value_end = marks.get(idx + 1).map_or(field.len(), |&(next, _)| next);
            pairs.push((key, field[end..value_end].to_vec()));
        }
        pairs
    }

    /// Join ordered pairs back into a field value.
    ///
    /// A leading pair keyed with the first-key is emitted bare; every other
    /// pair is emitted as delimiter + key + value.
    ///
    /// # Errors
    ///
    /// With checking enabled, returns [`IsisError::Overflow`] when the
    /// joined field would not re-parse to the given pairs — e.g. a value
    /// containing a delimiter-plus-key sequence, or an empty-valued
    /// leading prefix pair.
    pub fn unparse(&self, pairs: &[(u8, Vec<u8>)]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut rest = pairs;
        if let Some((key, value)) = pairs.first() {
            if *key == self.first {
                out.extend_from_slice(value);
                rest = &pairs[1..];
            }
        }
        for (key, value) in rest {
            out.push(self.prefix);
            out.push(*key);
            out.extend_from_slice(value);
        }

        if self.check {
            self.verify(&out, pairs)?;
        }
        Ok(out)
    }

    fn verify(&self, field: &[u8], pairs: &[(u8, Vec<u8>)]) -> Result<()> {
        let reparsed = self.parse(field);
        let matches = reparsed.len() == pairs.len()
            && reparsed.iter().zip(pairs).all(|((rk, rv), (pk, pv))| {
                let pk = if self.lowercase {
                    pk.to_ascii_lowercase()
                } else {
                    *pk
                };
                *rk == pk && rv == pv
            });
        if !matches {
            return Err(IsisError::Overflow(format!(
                "subfield pairs do not survive re-parsing of {:?}",
                String::from_utf8_lossy(field)
            )));
        }
        Ok(())
    }
}

impl Default for SubfieldParser {
    fn default() -> Self {
        SubfieldParser::new(DEFAULT_PREFIX)
    }
}
