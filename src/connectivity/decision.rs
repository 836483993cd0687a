//! Verdict decision table

use super::types::Verdict;

/// Combine the two range checks into a verdict
///
/// | local CGNAT | public CGNAT | verdict                    |
/// |-------------|--------------|----------------------------|
/// | true        | any          | `CgnatConfirmed`           |
/// | false       | false        | `LikelyCommonNatOrPublic`  |
/// | false       | true         | `Inconclusive`             |
pub fn classify(local_has_cgnat: bool, public_has_cgnat: bool) -> Verdict {
    match (local_has_cgnat, public_has_cgnat) {
        (true, _) => Verdict::CgnatConfirmed,
        (false, false) => Verdict::LikelyCommonNatOrPublic,
        (false, true) => Verdict::Inconclusive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_cgnat_always_confirms() {
        assert_eq!(classify(true, false), Verdict::CgnatConfirmed);
        assert_eq!(classify(true, true), Verdict::CgnatConfirmed);
    }

    #[test]
    fn test_no_cgnat_anywhere() {
        assert_eq!(classify(false, false), Verdict::LikelyCommonNatOrPublic);
    }

    #[test]
    fn test_public_only_is_inconclusive() {
        assert_eq!(classify(false, true), Verdict::Inconclusive);
    }
}
