mod engine;

use std::{
    fs::{self, Permissions},
    os::unix::fs::PermissionsExt,
    path::Path,
    time::Duration,
};

use crate::job::RunContext;

/// write a shell script, executable only if `exec`
pub fn script(dir: &Path, name: &str, body: &str, exec: bool) {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mode = if exec { 0o755 } else { 0o644 };
    fs::set_permissions(&path, Permissions::from_mode(mode)).unwrap();
}

/// a zombie counts as dead
pub fn alive(pid: i32) -> bool {
    match fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.trim_start().chars().next())
            .map(|state| state != 'Z' && state != 'X')
            .unwrap_or(false),
        Err(_) => false,
    }
}

/// poll until `pid` is gone, at most `limit`
pub async fn wait_dead(pid: i32, limit: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if !alive(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    !alive(pid)
}

pub fn read_pid(path: &Path) -> i32 {
    fs::read_to_string(path).unwrap().trim().parse().unwrap()
}

pub fn context() -> RunContext {
    RunContext {
        address: "http://host".to_owned(),
        user_api_key: "key".to_owned(),
        server_api_key: "secret".to_owned(),
        assignment_id: 3,
        group_id: 4,
        group_repo_name: "repo".to_owned(),
        submission_id: Some(5),
    }
}
