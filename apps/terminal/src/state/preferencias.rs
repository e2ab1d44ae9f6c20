//! # Preferences State
//!
//! The one piece of state that survives the session: the display theme.
//! Persisted as a small JSON file under the platform config directory and
//! loaded before the first screen is drawn, so the terminal never flashes
//! the wrong theme.
//!
//! Missing or corrupt file means defaults. Preferences are cosmetic, so a
//! failed write is logged and otherwise ignored.

use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

const ARCHIVO_PREFERENCIAS: &str = "preferencias.json";

/// Display theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tema {
    #[default]
    Claro,
    Oscuro,
}

impl Tema {
    pub fn alternado(self) -> Tema {
        match self {
            Tema::Claro => Tema::Oscuro,
            Tema::Oscuro => Tema::Claro,
        }
    }
}

/// Persisted preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferencias {
    #[serde(default)]
    pub tema: Tema,
}

/// Shared preferences handle. Writes through to disk on every change.
#[derive(Debug)]
pub struct PreferenciasState {
    prefs: Mutex<Preferencias>,
    ruta: Option<PathBuf>,
}

impl PreferenciasState {
    /// Loads preferences from the platform config directory.
    pub fn cargar() -> Self {
        let ruta = ruta_preferencias();
        let prefs = ruta
            .as_deref()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|texto| serde_json::from_str(&texto).ok())
            .unwrap_or_default();
        PreferenciasState {
            prefs: Mutex::new(prefs),
            ruta,
        }
    }

    /// In-memory state with no backing file, for tests.
    #[cfg(test)]
    pub fn en_memoria() -> Self {
        PreferenciasState {
            prefs: Mutex::new(Preferencias::default()),
            ruta: None,
        }
    }

    pub fn tema(&self) -> Tema {
        self.prefs.lock().expect("prefs mutex poisoned").tema
    }

    /// Flips the theme and persists the result.
    pub fn alternar_tema(&self) -> Tema {
        let nuevo = {
            let mut prefs = self.prefs.lock().expect("prefs mutex poisoned");
            prefs.tema = prefs.tema.alternado();
            prefs.tema
        };
        self.guardar();
        nuevo
    }

    fn guardar(&self) {
        let Some(ruta) = self.ruta.as_deref() else {
            return;
        };
        let prefs = self.prefs.lock().expect("prefs mutex poisoned").clone();
        let resultado = std::fs::create_dir_all(ruta.parent().unwrap_or(ruta)).and_then(|_| {
            let json = serde_json::to_string_pretty(&prefs)?;
            std::fs::write(ruta, json)
        });
        if let Err(e) = resultado {
            tracing::warn!("no se pudieron guardar las preferencias: {}", e);
        }
    }
}

fn ruta_preferencias() -> Option<PathBuf> {
    ProjectDirs::from("com", "tienda", "tienda-terminal")
        .map(|dirs| dirs.config_dir().join(ARCHIVO_PREFERENCIAS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternar_tema() {
        let estado = PreferenciasState::en_memoria();
        assert_eq!(estado.tema(), Tema::Claro);
        assert_eq!(estado.alternar_tema(), Tema::Oscuro);
        assert_eq!(estado.alternar_tema(), Tema::Claro);
    }

    #[test]
    fn test_preferencias_json() {
        let prefs: Preferencias = serde_json::from_str(r#"{"tema":"oscuro"}"#).unwrap();
        assert_eq!(prefs.tema, Tema::Oscuro);

        // Unknown-free file falls back to the default theme.
        let prefs: Preferencias = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs.tema, Tema::Claro);
    }
}
