use core::str;
use core::str::FromStr;

use defmt::Format;
use heapless::String;

/// Boundary to whatever owns the raw request: enough to learn how long the
/// query component is and to copy it out into a caller provided buffer.
pub trait QuerySource {
    fn query_len(&self) -> usize;
    fn copy_query(&self, buf: &mut [u8]) -> Result<usize, &'static str>;
}

#[derive(Debug, PartialEq, Format)]
pub enum QueryKvError {
    NotFound,
    /// The key exists but its value did not fit the destination buffer.
    /// Whatever did fit has been written.
    Truncated,
}

/// Failure of a typed parameter accessor. Both variants carry the offending
/// key; `Invalid` additionally carries the raw value that refused to convert.
#[derive(Debug, PartialEq, Format)]
pub enum ParamError<'a> {
    Missing(&'a str),
    Invalid(&'a str, &'a str),
}

/// Find the value for `key` in an `&`-separated `key=value` query string and
/// copy it into `buf`, returning the copied length. A bare token without `=`
/// never matches, and the first matching pair wins. Keys must not contain
/// `=` or `&`, those bytes are the field separators.
pub fn query_key_value(query: &str, key: &str, buf: &mut [u8]) -> Result<usize, QueryKvError> {
    let value = match find_value(query, key) {
        Some(v) => v.as_bytes(),
        None => return Err(QueryKvError::NotFound),
    };

    if value.len() > buf.len() {
        let fits = buf.len();
        buf.copy_from_slice(&value[..fits]);
        return Err(QueryKvError::Truncated);
    }

    buf[..value.len()].copy_from_slice(value);
    Ok(value.len())
}

fn find_value<'q>(query: &'q str, key: &str) -> Option<&'q str> {
    if key.is_empty() {
        return None;
    }

    for pair in query.split('&') {
        if let Some((k, v)) = pair.split_once('=')
            && k == key
        {
            return Some(v);
        }
    }

    None
}

/// The query parameters of one request, captured at construction and
/// immutable afterwards. One instance per request; lookups never mutate it.
///
/// `CAP` bounds the stored query string. A request whose query component is
/// longer than `CAP`, or whose extraction fails, degrades to a store over the
/// empty string where every lookup reports "not found" - construction never
/// fails and never keeps partially written content.
pub struct QueryParams<const CAP: usize> {
    raw: String<CAP>,
}

impl<const CAP: usize> QueryParams<CAP> {
    pub fn from_request<S: QuerySource>(req: &S) -> Self {
        let mut raw = String::new();

        let len = req.query_len();
        if len > 0 && len <= CAP {
            let mut buf = [0u8; CAP];
            match req.copy_query(&mut buf[..len]) {
                Ok(n) if n <= len => {
                    if let Ok(s) = str::from_utf8(&buf[..n]) {
                        // n <= CAP so the copy cannot overflow the store
                        raw.push_str(s).ok();
                    }
                }
                _ => {}
            }
        }

        Self { raw }
    }

    /// True iff `key` is present as a `key=value` pair (the value may be
    /// empty). Existence is probed with a deliberately undersized one byte
    /// buffer: a truncated value still proves presence, and no value sized
    /// allocation is ever needed just to test for a key.
    pub fn contains(&self, key: &str) -> bool {
        let mut probe = [0u8; 1];
        match query_key_value(&self.raw, key, &mut probe) {
            Ok(_) | Err(QueryKvError::Truncated) => true,
            Err(QueryKvError::NotFound) => false,
        }
    }

    /// The value for `key`, or the empty string when the key is absent, the
    /// query is empty, or extraction fails. An absent key and a present key
    /// with an empty value are indistinguishable from this call alone; call
    /// [`Self::contains`] first when that matters.
    pub fn get(&self, key: &str) -> String<CAP> {
        // a value can never be longer than the whole query string, so a
        // scratch slice sized to the query always holds it untruncated
        let mut scratch = [0u8; CAP];
        let len = self.raw.len();

        let mut value = String::new();
        if let Ok(n) = query_key_value(&self.raw, key, &mut scratch[..len]) {
            if let Ok(s) = str::from_utf8(&scratch[..n]) {
                value.push_str(s).ok();
            }
        }

        value
    }

    /// The value for `key` converted to `i32`. Conversion accepts only a
    /// whole-string parse: trailing garbage, an empty value, and values out
    /// of range for the target type are all [`ParamError::Invalid`], never
    /// truncated to a numeric prefix.
    pub fn get_i32<'s>(&'s self, key: &'s str) -> Result<i32, ParamError<'s>> {
        self.parse_value(key)
    }

    pub fn get_u32<'s>(&'s self, key: &'s str) -> Result<u32, ParamError<'s>> {
        self.parse_value(key)
    }

    pub fn get_i64<'s>(&'s self, key: &'s str) -> Result<i64, ParamError<'s>> {
        self.parse_value(key)
    }

    pub fn get_u64<'s>(&'s self, key: &'s str) -> Result<u64, ParamError<'s>> {
        self.parse_value(key)
    }

    pub fn get_f32<'s>(&'s self, key: &'s str) -> Result<f32, ParamError<'s>> {
        let raw = find_value(&self.raw, key).ok_or(ParamError::Missing(key))?;
        match raw.parse::<f32>() {
            // an out of range literal parses to infinity rather than failing,
            // so anything non finite counts as a conversion failure
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(ParamError::Invalid(key, raw)),
        }
    }

    /// Zero-fallback twin of [`Self::get_i32`]: an absent key and an
    /// unconvertible value both collapse to `0`, for callers that cannot
    /// tell the difference anyway. The `get_*` family reports which one it
    /// was.
    pub fn get_i32_or_default(&self, key: &str) -> i32 {
        self.get_i32(key).unwrap_or_default()
    }

    pub fn get_u32_or_default(&self, key: &str) -> u32 {
        self.get_u32(key).unwrap_or_default()
    }

    pub fn get_i64_or_default(&self, key: &str) -> i64 {
        self.get_i64(key).unwrap_or_default()
    }

    pub fn get_u64_or_default(&self, key: &str) -> u64 {
        self.get_u64(key).unwrap_or_default()
    }

    pub fn get_f32_or_default(&self, key: &str) -> f32 {
        self.get_f32(key).unwrap_or_default()
    }

    fn parse_value<'s, T: FromStr>(&'s self, key: &'s str) -> Result<T, ParamError<'s>> {
        let raw = find_value(&self.raw, key).ok_or(ParamError::Missing(key))?;
        raw.parse().or(Err(ParamError::Invalid(key, raw)))
    }
}
