//! Configuration for decoding.
//!
//! [`DecodeOptions`] is an immutable value handed to the parser; nothing in
//! the crate keeps process-wide state.
//!
//! ```rust
//! use libyadil::{decode_with_options, DecodeOptions};
//!
//! let options = DecodeOptions::new().with_filename("inbox.yadil");
//! let doc = decode_with_options("Y.1.4;u@n=1;", &options).unwrap();
//! assert_eq!(doc.version.minor, 4);
//!
//! // Strict decoding requires the version header.
//! assert!(decode_with_options("u@n=1;", &DecodeOptions::strict()).is_err());
//! ```

/// Options controlling how documents are decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeOptions {
    /// Major versions accepted in the header; minor versions are always accepted.
    pub supported_majors: Vec<u64>,
    /// Fail when the `Y.major.minor;` header is missing.
    pub require_version: bool,
    /// Accept `nan`, `inf` and `-inf` as float literals.
    pub non_finite_floats: bool,
    /// Maximum number of lists and maps open at once.
    pub max_depth: usize,
    /// Source name used in error messages.
    pub filename: Option<String>,
}

/// Default for [`DecodeOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            supported_majors: vec![1],
            require_version: false,
            non_finite_floats: true,
            max_depth: DEFAULT_MAX_DEPTH,
            filename: None,
        }
    }
}

impl DecodeOptions {
    /// Default options: header optional, non-finite floats accepted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Header required, non-finite floats rejected.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            require_version: true,
            non_finite_floats: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_supported_majors(mut self, majors: impl Into<Vec<u64>>) -> Self {
        self.supported_majors = majors.into();
        self
    }

    #[must_use]
    pub fn with_require_version(mut self, require: bool) -> Self {
        self.require_version = require;
        self
    }

    #[must_use]
    pub fn with_non_finite_floats(mut self, allow: bool) -> Self {
        self.non_finite_floats = allow;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Whether a header with this major version is accepted.
    pub fn supports_major(&self, major: u64) -> bool {
        self.supported_majors.contains(&major)
    }
}
