/// HTTP Range header evaluation
///
/// Single-range subset of RFC 7233: `bytes=a-b`, `bytes=a-` and the suffix
/// form `bytes=-n`. Multi-range requests and non-`bytes` units are ignored
/// entirely (the RFC permits a server to ignore `Range`), which downgrades
/// them to a full 200 response. A present but malformed or unsatisfiable
/// `bytes=` value yields 416.

/// What to do with a request after looking at its `Range` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    /// Serve the whole object with 200
    Full,

    /// Serve the inclusive window `start..=end` with 206
    Partial { start: u64, end: u64 },

    /// Reply 416 with `Content-Range: bytes */{size}`
    Unsatisfiable,
}

/// Evaluate an optional `Range` header value against the object size
pub fn evaluate(header: Option<&str>, size: u64) -> RangeOutcome {
    let Some(value) = header else {
        return RangeOutcome::Full;
    };

    // Other units are ignored, not rejected
    let Some(spec) = value.strip_prefix("bytes=") else {
        return RangeOutcome::Full;
    };

    // Multi-range is ignored likewise; clients that send it get the whole
    // object and slice locally
    if spec.contains(',') {
        return RangeOutcome::Full;
    }

    let Some((start_str, end_str)) = spec.trim().split_once('-') else {
        return RangeOutcome::Unsatisfiable;
    };

    if size == 0 {
        return RangeOutcome::Unsatisfiable;
    }

    let (start, end) = if start_str.is_empty() {
        // Suffix form: the final n bytes, clamped to the object start
        let Ok(n) = end_str.parse::<u64>() else {
            return RangeOutcome::Unsatisfiable;
        };
        if n == 0 {
            return RangeOutcome::Unsatisfiable;
        }
        (size.saturating_sub(n), size - 1)
    } else {
        let Ok(start) = start_str.parse::<u64>() else {
            return RangeOutcome::Unsatisfiable;
        };
        let end = if end_str.is_empty() {
            size - 1
        } else {
            match end_str.parse::<u64>() {
                Ok(end) => end,
                Err(_) => return RangeOutcome::Unsatisfiable,
            }
        };
        (start, end)
    };

    if start <= end && end < size {
        RangeOutcome::Partial { start, end }
    } else {
        RangeOutcome::Unsatisfiable
    }
}
