//! Parse a file-lookup response body into a ModFile.

use serde::Deserialize;

use super::{FetchError, ModFile};

/// `algo` value the API uses for MD5 in `hashes[]`.
pub const HASH_ALGO_MD5: u32 = 2;

#[derive(Debug, Deserialize)]
struct FileResponse {
    data: FileData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    display_name: String,
    download_url: Option<String>,
    file_name: String,
    #[serde(default)]
    hashes: Vec<FileHash>,
}

#[derive(Debug, Deserialize)]
struct FileHash {
    algo: u32,
    value: String,
}

/// Parse `{data: {displayName, downloadUrl, fileName, hashes: [{algo, value}]}}`.
pub fn parse_file_response(body: &[u8]) -> Result<ModFile, FetchError> {
    let FileResponse { data } = serde_json::from_slice(body)?;
    let download_url = data
        .download_url
        .filter(|u| !u.is_empty())
        .ok_or(FetchError::MissingDownloadUrl)?;
    let hash = data
        .hashes
        .into_iter()
        .find(|h| h.algo == HASH_ALGO_MD5)
        .map(|h| h.value.to_ascii_lowercase());

    Ok(ModFile {
        display_name: data.display_name,
        download_url,
        file_name: data.file_name,
        hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_md5_entry() {
        let body = br#"{"data":{
            "id": 4371366,
            "displayName": "JEI 1.20.1",
            "downloadUrl": "https://edge.forgecdn.net/files/4371/366/jei.jar",
            "fileName": "jei.jar",
            "hashes": [
                {"value": "da39a3ee5e6b4b0d3255bfef95601890afd80709", "algo": 1},
                {"value": "D41D8CD98F00B204E9800998ECF8427E", "algo": 2}
            ]
        }}"#;
        let f = parse_file_response(body).unwrap();
        assert_eq!(f.display_name, "JEI 1.20.1");
        assert_eq!(f.file_name, "jei.jar");
        assert_eq!(
            f.download_url,
            "https://edge.forgecdn.net/files/4371/366/jei.jar"
        );
        assert_eq!(f.hash.as_deref(), Some("d41d8cd98f00b204e9800998ecf8427e"));
    }

    #[test]
    fn no_md5_entry_leaves_hash_absent() {
        let body = br#"{"data":{"displayName":"A","downloadUrl":"http://x/a.jar","fileName":"a.jar",
            "hashes":[{"value":"da39a3ee5e6b4b0d3255bfef95601890afd80709","algo":1}]}}"#;
        let f = parse_file_response(body).unwrap();
        assert!(f.hash.is_none());
    }

    #[test]
    fn missing_hashes_array_is_empty() {
        let body = br#"{"data":{"displayName":"A","downloadUrl":"http://x/a.jar","fileName":"a.jar"}}"#;
        let f = parse_file_response(body).unwrap();
        assert!(f.hash.is_none());
    }

    #[test]
    fn null_download_url_is_an_error() {
        let body = br#"{"data":{"displayName":"A","downloadUrl":null,"fileName":"a.jar","hashes":[]}}"#;
        assert!(matches!(
            parse_file_response(body),
            Err(FetchError::MissingDownloadUrl)
        ));
    }

    #[test]
    fn malformed_body_is_json_error() {
        assert!(matches!(
            parse_file_response(b"<html>oops</html>"),
            Err(FetchError::Json(_))
        ));
        assert!(matches!(
            parse_file_response(br#"{"error":"not found"}"#),
            Err(FetchError::Json(_))
        ));
    }
}
