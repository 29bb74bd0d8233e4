#![cfg(unix)]

use apprun_fs::{LinkWalk, MAX_SYMLINK_HOPS, atomic_symlink, resolve_link_chain, symlink};
use tempfile::tempdir;

#[test]
fn test_walk_from_user_link_into_environment() {
    let dir = tempdir().unwrap();
    let root = std::fs::canonicalize(dir.path()).unwrap();
    let bundle = root.join("app.AppImage");
    std::fs::write(&bundle, "").unwrap();

    let env_bin = root.join("env").join("bin");
    std::fs::create_dir_all(&env_bin).unwrap();
    symlink(&bundle, env_bin.join("python3")).unwrap();
    symlink("python3", env_bin.join("mytool")).unwrap();

    let user_bin = root.join("home").join("bin");
    std::fs::create_dir_all(&user_bin).unwrap();
    symlink(env_bin.join("mytool"), user_bin.join("mytool")).unwrap();

    let hops: Vec<_> = LinkWalk::new(user_bin.join("mytool")).collect();
    assert_eq!(
        hops,
        vec![
            user_bin.join("mytool"),
            env_bin.join("mytool"),
            env_bin.join("python3"),
        ]
    );
    assert_eq!(resolve_link_chain(&user_bin.join("mytool")).unwrap(), bundle);
}

#[test]
fn test_walk_is_bounded_on_long_chains() {
    let dir = tempdir().unwrap();
    let end = dir.path().join("end");
    std::fs::write(&end, "").unwrap();

    let mut previous = end.clone();
    for i in 0..(MAX_SYMLINK_HOPS + 5) {
        let link = dir.path().join(format!("link{i}"));
        symlink(&previous, &link).unwrap();
        previous = link;
    }

    assert_eq!(LinkWalk::new(&previous).count(), MAX_SYMLINK_HOPS);
    assert!(resolve_link_chain(&previous).is_err());
}

#[test]
fn test_atomic_symlink_redirects_chain() {
    let dir = tempdir().unwrap();
    let native = dir.path().join("python3.11");
    let bundle = dir.path().join("AppRun");
    std::fs::write(&native, "").unwrap();
    std::fs::write(&bundle, "").unwrap();

    let link = dir.path().join("python3");
    symlink(&native, &link).unwrap();
    assert_eq!(resolve_link_chain(&link).unwrap(), native);

    atomic_symlink(&bundle, &link).unwrap();
    assert_eq!(resolve_link_chain(&link).unwrap(), bundle);
}
