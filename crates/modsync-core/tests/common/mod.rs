#![allow(dead_code)]

pub mod mock_server;

use std::io::Write;

/// MD5 (lowercase hex) of `body`, via the crate's own file hasher.
pub fn md5_of(body: &[u8]) -> String {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(body).unwrap();
    f.flush().unwrap();
    modsync_core::checksum::md5_path(f.path()).unwrap()
}

/// File-lookup response body as the API returns it.
pub fn file_json(display_name: &str, download_url: &str, file_name: &str, md5: Option<&str>) -> Vec<u8> {
    let mut hashes = vec![serde_json::json!({
        "value": "da39a3ee5e6b4b0d3255bfef95601890afd80709",
        "algo": 1
    })];
    if let Some(md5) = md5 {
        hashes.push(serde_json::json!({ "value": md5, "algo": 2 }));
    }
    serde_json::to_vec(&serde_json::json!({
        "data": {
            "id": 1,
            "displayName": display_name,
            "downloadUrl": download_url,
            "fileName": file_name,
            "hashes": hashes
        }
    }))
    .unwrap()
}

/// Lookup path for a (projectID, fileID) pair.
pub fn lookup_path(project_id: u64, file_id: u64) -> String {
    format!("/v1/mods/{}/files/{}", project_id, file_id)
}
