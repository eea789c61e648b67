//! Security policy boundary behavior.

use gp_fsbridge::{ReadWriteSecurityPolicy, SecurityError};

#[test]
fn blacklist_dominates_explicit_read_listing() {
    let policy = ReadWriteSecurityPolicy::new(&[], &["/etc/passwd".to_string()]);

    let result = policy.validate_read_path("/etc/passwd");

    assert!(matches!(result, Err(SecurityError::SystemDirectory(_))));
    assert_eq!(policy.violation_count(), 1);
}

#[test]
fn traversal_is_rejected_for_reads_and_writes() {
    let policy = ReadWriteSecurityPolicy::new(&["out/".to_string()], &[]);

    assert!(matches!(
        policy.validate_read_path("docs/../../etc/shadow"),
        Err(SecurityError::PathTraversal(_))
    ));
    assert!(matches!(
        policy.validate_write_path("out/../elsewhere/file"),
        Err(SecurityError::PathTraversal(_))
    ));
    assert_eq!(policy.violation_count(), 2);
}

#[test]
fn writes_are_confined_to_allowed_and_temp_paths() {
    let policy = ReadWriteSecurityPolicy::new(&["build".to_string()], &[]);

    assert!(policy.validate_write_path("build/report.json").is_ok());
    assert!(policy.validate_write_path("/tmp/report.json").is_ok());
    assert!(policy.validate_write_path("tmp/scratch.json").is_ok());
    assert!(matches!(
        policy.validate_write_path("src/main.rs"),
        Err(SecurityError::WriteDenied(_))
    ));
    assert!(matches!(
        policy.validate_write_path("/home/alice/file"),
        Err(SecurityError::AbsoluteWriteDenied(_))
    ));
}

#[test]
fn project_root_scopes_absolute_reads() {
    let mut policy = ReadWriteSecurityPolicy::new(&[], &[]);
    policy.set_project_root("/work/repo");

    assert_eq!(
        policy.validate_read_path("/work/repo/docs/a.md").unwrap(),
        "docs/a.md"
    );
    assert!(policy.validate_read_path("/work/other/docs/a.md").is_err());
}
