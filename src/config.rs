use std::{env, net::SocketAddr, path::PathBuf};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_PATH: &str = "data/schedule.sqlite";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub db_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_vars(env::var("PORT").ok(), env::var("SCHEDULE_DB_PATH").ok())
    }

    fn from_vars(port: Option<String>, db_path: Option<String>) -> Self {
        let port = port
            .and_then(|value| value.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let db_path = db_path
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        Self { port, db_path }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let settings = Settings::from_vars(None, None);
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.db_path, PathBuf::from(DEFAULT_DB_PATH));
    }

    #[test]
    fn unparsable_port_falls_back() {
        let settings = Settings::from_vars(Some("http".into()), Some("/tmp/x.sqlite".into()));
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.db_path, PathBuf::from("/tmp/x.sqlite"));
    }

    #[test]
    fn explicit_values_win() {
        let settings = Settings::from_vars(Some("8181".into()), Some("visits.db".into()));
        assert_eq!(settings.port, 8181);
        assert_eq!(settings.listen_addr().port(), 8181);
        assert_eq!(settings.db_path, PathBuf::from("visits.db"));
    }
}
