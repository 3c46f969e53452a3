use crate::session::BriefSession;
use fs_err as fs;
use serde_json::to_string_pretty;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub struct SavedPaths {
    pub dir: PathBuf,
    pub answers: PathBuf,
    pub brief: Option<PathBuf>,
}

pub fn session_dir(root: &Path, session: Uuid) -> PathBuf {
    root.join(".ugc").join("sessions").join(session.to_string())
}

/// Writes `answers.json` and, when given, `brief.md` for the session.
pub fn save_session(root: &Path, session: &BriefSession, brief: Option<&str>) -> anyhow::Result<SavedPaths> {
    let dir = session_dir(root, session.id());
    fs::create_dir_all(&dir)?;

    let answers = dir.join("answers.json");
    fs::write(&answers, to_string_pretty(&session.record())?)?;

    let brief = match brief {
        Some(text) => {
            let p = dir.join("brief.md");
            fs::write(&p, text)?;
            Some(p)
        }
        None => None,
    };

    info!(dir = %dir.display(), "session saved");
    Ok(SavedPaths { dir, answers, brief })
}

pub fn print_saved_paths(saved: &SavedPaths) {
    println!("session directory: {}", saved.dir.display());
    println!("answers saved at: {}", saved.answers.display());
    match &saved.brief {
        Some(p) => println!("brief saved at: {}", p.display()),
        None => println!("brief not saved (no brief rendered)"),
    }
    std::io::stdout().flush().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_answers_and_brief() {
        let tmp = tempfile::tempdir().unwrap();
        let mut session = BriefSession::new();
        session.answer("product_name", "GlowSerum");

        let saved = save_session(tmp.path(), &session, Some("# Brief")).unwrap();
        assert!(saved.dir.ends_with(session.id().to_string()));
        assert!(saved.dir.starts_with(tmp.path().join(".ugc").join("sessions")));

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&saved.answers).unwrap()).unwrap();
        assert_eq!(json["session_id"], session.id().to_string());
        assert_eq!(json["answers"][0]["value"], "GlowSerum");
        assert_eq!(fs::read_to_string(saved.brief.unwrap()).unwrap(), "# Brief");
    }

    #[test]
    fn brief_is_optional() {
        let tmp = tempfile::tempdir().unwrap();
        let saved = save_session(tmp.path(), &BriefSession::new(), None).unwrap();
        assert!(saved.answers.exists());
        assert!(saved.brief.is_none());
    }
}
