//! # Layer Trait
//!
//! Tower-style composition for file sources.
//!
//! ## Overview
//!
//! A [`Layer`] turns one source into another. The crate ships two layers
//! that build a [`MergedFs`]: [`Overlay`] stacks a source *above* the one
//! being wrapped, [`Underlay`] places one *below* it. [`LayerExt`] adds a
//! fluent `.layer()` to every source.
//!
//! ```text
//! base ──▶ .layer(Overlay::new(patch)) ──▶ MergedFs<patch, base>
//! base ──▶ .layer(Underlay::new(defaults)) ──▶ MergedFs<base, defaults>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use merged_fs::sources::MemorySource;
//! use merged_fs::{FileSourceExt, LayerExt, Overlay, Underlay};
//!
//! let stack = MemorySource::new()
//!     .with_file("app.conf", "site")
//!     .layer(Underlay::new(MemorySource::new().with_file("app.conf", "vendor").with_file("extra", "x")))
//!     .layer(Overlay::new(MemorySource::new().with_file("app.conf", "user")));
//!
//! assert_eq!(stack.read_to_string("app.conf").unwrap(), "user");
//! assert_eq!(stack.read_to_string("extra").unwrap(), "x");
//! ```

use crate::{FileSource, MergeOptions, MergedFs};

/// A layer that wraps a source to produce a new one.
///
/// `layer(self, source)` consumes both the layer and the source. Layers are
/// compile-time composition; the trait is not object safe.
pub trait Layer<S> {
    /// The resulting source type.
    type Source;

    /// Wrap `source`.
    fn layer(self, source: S) -> Self::Source;
}

/// Extension trait for fluent layer composition.
pub trait LayerExt: FileSource + Sized {
    /// Apply a layer to this source.
    fn layer<L: Layer<Self>>(self, layer: L) -> L::Source {
        layer.layer(self)
    }
}

impl<S: FileSource> LayerExt for S {}

/// Places a source at higher priority than the wrapped one.
#[derive(Debug, Clone)]
pub struct Overlay<A> {
    upper: A,
    options: MergeOptions,
}

impl<A: FileSource> Overlay<A> {
    /// Stack `upper` above the wrapped source.
    pub fn new(upper: A) -> Self {
        Self::with_options(upper, MergeOptions::default())
    }

    /// Like [`new`](Self::new), with explicit merge options.
    pub fn with_options(upper: A, options: MergeOptions) -> Self {
        Self { upper, options }
    }
}

impl<A: FileSource, S: FileSource> Layer<S> for Overlay<A> {
    type Source = MergedFs<A, S>;

    fn layer(self, source: S) -> Self::Source {
        MergedFs::with_options(self.upper, source, self.options)
    }
}

/// Places a source at lower priority than the wrapped one.
#[derive(Debug, Clone)]
pub struct Underlay<B> {
    lower: B,
    options: MergeOptions,
}

impl<B: FileSource> Underlay<B> {
    /// Place `lower` beneath the wrapped source.
    pub fn new(lower: B) -> Self {
        Self::with_options(lower, MergeOptions::default())
    }

    /// Like [`new`](Self::new), with explicit merge options.
    pub fn with_options(lower: B, options: MergeOptions) -> Self {
        Self { lower, options }
    }
}

impl<B: FileSource, S: FileSource> Layer<S> for Underlay<B> {
    type Source = MergedFs<S, B>;

    fn layer(self, source: S) -> Self::Source {
        MergedFs::with_options(source, self.lower, self.options)
    }
}
