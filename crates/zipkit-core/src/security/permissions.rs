//! Permission sanitization for extracted files.

/// Reduces a Unix mode from an archive to plain permission bits.
///
/// File-type bits, setuid, setgid and sticky are dropped; only the `rwx`
/// bits for user, group and other survive.
///
/// # Examples
///
/// ```
/// use zipkit_core::security::sanitize_permissions;
///
/// assert_eq!(sanitize_permissions(0o100_755), 0o755);
/// assert_eq!(sanitize_permissions(0o4755), 0o755);
/// ```
#[must_use]
pub const fn sanitize_permissions(mode: u32) -> u32 {
    mode & 0o777
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_mode_unchanged() {
        assert_eq!(sanitize_permissions(0o644), 0o644);
        assert_eq!(sanitize_permissions(0o700), 0o700);
    }

    #[test]
    fn test_special_bits_removed() {
        assert_eq!(sanitize_permissions(0o4755), 0o755);
        assert_eq!(sanitize_permissions(0o2755), 0o755);
        assert_eq!(sanitize_permissions(0o1777), 0o777);
    }

    #[test]
    fn test_file_type_bits_removed() {
        assert_eq!(sanitize_permissions(0o100_644), 0o644);
        assert_eq!(sanitize_permissions(0o040_755), 0o755);
    }
}
