// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixed self-test page.

/// A BRF page an operator can verify by touch:
///
/// 1. heading (`,` is the capital sign in grade 1)
/// 2. alphabet rows a-j, k-t, u-z
/// 3. numbers 1-5 with the number sign
/// 4. "hello world" in grade 2 (`_w` is the contraction for "world")
pub const TEST_PAGE: &[u8] = b",GRAHAM BRIDGE TE/ PAGE\r\n\
\r\n\
abcdefghij\r\n\
klmnopqrst\r\n\
uvwxyz\r\n\
\r\n\
#a #b #c #d #e\r\n\
\r\n\
hello _w.\r\n";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_is_fixed_ascii_with_crlf() {
        assert_eq!(TEST_PAGE.len(), 90);
        assert!(TEST_PAGE.is_ascii());
        assert!(TEST_PAGE.starts_with(b",GRAHAM BRIDGE TE/ PAGE\r\n\r\nabcdefghij"));
        assert!(TEST_PAGE.ends_with(b"hello _w.\r\n"));
        let bare_lf = TEST_PAGE
            .windows(2)
            .any(|w| w[1] == b'\n' && w[0] != b'\r');
        assert!(!bare_lf);
    }
}
