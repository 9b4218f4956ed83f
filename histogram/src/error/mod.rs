// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use thiserror::Error;

/// Possible errors returned by operations on a histogram.
#[derive(Error, Debug)]
pub enum Error {
    #[error("histogram contains no samples")]
    /// The histogram contains no samples.
    Empty,
    #[error("invalid percentile")]
    /// The provided percentile is outside of the range 0.0 - 100.0 (inclusive)
    InvalidPercentile,
    #[error("value out of range")]
    /// The value is above the highest trackable value and the histogram is
    /// configured to discard out of range values.
    OutOfRange,
    #[error("counter overflow")]
    /// Incrementing would exceed the configured counter width. The histogram
    /// is unchanged.
    Overflow,
    #[error("counter underflow")]
    /// Subtracting would take a counter below zero. The histogram is
    /// unchanged.
    Underflow,
    #[error("invalid configuration")]
    /// The construction parameters do not describe a representable histogram.
    InvalidConfig,
    #[error("incompatible histogram")]
    /// The other histogram was configured with a different value range or
    /// precision.
    IncompatibleHistogram,
    #[error("encoded histogram truncated")]
    /// The encoded stream ended inside a header field or a varint.
    Truncated,
    #[error("encoded value overflow")]
    /// The encoded stream holds a count which exceeds the destination counter
    /// width, or writes past the end of the counts array.
    ValueOverflow,
    #[error("unknown encoding cookie")]
    /// The encoded stream does not begin with the V2 cookie.
    UnknownCookie,
    #[error("count not serializable")]
    /// A count above i64::MAX cannot be zig-zag encoded.
    CountNotSerializable,
    #[error("i/o error: {0}")]
    /// An i/o operation on the provided writer failed.
    Io(#[from] std::io::Error),
}
