use anyhow::anyhow;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Command response  —  GET /json.htm?type=command&param=udevice&...
//
// Success:
//   { "status": "OK", "title": "Update Device" }
//
// Failure:
//   { "status": "ERR", "message": "..." }
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CommandResponse {
    /// `"OK"` on success, `"ERR"` otherwise.
    pub status: String,

    /// Name of the executed command; present on success.
    pub title: Option<String>,

    /// Present on some failures.
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn into_result(self) -> anyhow::Result<()> {
        if self.status == "OK" {
            Ok(())
        } else {
            Err(anyhow!(
                "Domoticz error: status={}, message={}",
                self.status,
                self.message.as_deref().unwrap_or("(no message)")
            ))
        }
    }
}
