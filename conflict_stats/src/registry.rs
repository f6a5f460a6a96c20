use log::debug;
use std::collections::HashMap;

use unidecode::unidecode;

use crate::config::StatsErrors;

/// The first-level administrative divisions of Colombia, as they should be written.
pub const COLOMBIA_DEPARTMENTS: [&str; 32] = [
    "Amazonas",
    "Antioquia",
    "Arauca",
    "Atlántico",
    "Bolívar",
    "Boyacá",
    "Caldas",
    "Caquetá",
    "Casanare",
    "Cauca",
    "Cesar",
    "Chocó",
    "Córdoba",
    "Cundinamarca",
    "Guainía",
    "Guaviare",
    "Huila",
    "La Guajira",
    "Magdalena",
    "Meta",
    "Nariño",
    "Norte de Santander",
    "Putumayo",
    "Quindío",
    "Risaralda",
    "San Andrés, Providencia y Santa Catalina",
    "Santander",
    "Sucre",
    "Tolima",
    "Valle del Cauca",
    "Vaupés",
    "Vichada",
];

/// The accent-stripped, upper-cased form of a department name.
pub fn correction_key(name: &str) -> String {
    unidecode(name).to_uppercase()
}

/// The closed set of canonical department names.
///
/// Built once and shared by reference with everything that normalizes records.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DepartmentRegistry {
    names: Vec<String>,
    by_key: HashMap<String, usize>,
}

impl DepartmentRegistry {
    /// The registry of the 32 Colombian departments.
    pub fn colombia() -> Result<DepartmentRegistry, StatsErrors> {
        DepartmentRegistry::from_names(&COLOMBIA_DEPARTMENTS)
    }

    /// Builds a registry. Fails if two names share a correction key.
    pub fn from_names(names: &[&str]) -> Result<DepartmentRegistry, StatsErrors> {
        let mut by_key: HashMap<String, usize> = HashMap::new();
        for (idx, name) in names.iter().enumerate() {
            let key = correction_key(name);
            if let Some(&previous) = by_key.get(&key) {
                return Err(StatsErrors::DuplicateCorrectionKey {
                    key,
                    first: names[previous].to_string(),
                    second: name.to_string(),
                });
            }
            by_key.insert(key, idx);
        }
        debug!("DepartmentRegistry: {} departments", names.len());
        Ok(DepartmentRegistry {
            names: names.iter().map(|s| s.to_string()).collect(),
            by_key,
        })
    }

    /// The canonical names, in registry order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// The canonical name whose correction key matches the one of `raw`.
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        self.by_key
            .get(&correction_key(raw))
            .map(|&idx| self.names[idx].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colombia_keys_are_distinct() {
        let reg = DepartmentRegistry::colombia().unwrap();
        assert_eq!(reg.names().len(), 32);
        assert_eq!(reg.by_key.len(), 32);
    }

    #[test]
    fn keys_strip_accents() {
        assert_eq!(correction_key("Nariño"), "NARINO");
        assert_eq!(correction_key("Quindío"), "QUINDIO");
        assert_eq!(
            correction_key("San Andrés, Providencia y Santa Catalina"),
            "SAN ANDRES, PROVIDENCIA Y SANTA CATALINA"
        );
    }

    #[test]
    fn lookup_returns_canonical_spelling() {
        let reg = DepartmentRegistry::colombia().unwrap();
        assert_eq!(reg.lookup("BOLIVAR"), Some("Bolívar"));
        assert_eq!(reg.lookup("bolívar"), Some("Bolívar"));
        assert_eq!(reg.lookup("VALLE DEL CAUCA"), Some("Valle del Cauca"));
        assert_eq!(reg.lookup("Bogotá"), None);
    }

    #[test]
    fn collision_is_rejected() {
        let res = DepartmentRegistry::from_names(&["Bolívar", "Bolivar"]);
        assert_eq!(
            res,
            Err(StatsErrors::DuplicateCorrectionKey {
                key: "BOLIVAR".to_string(),
                first: "Bolívar".to_string(),
                second: "Bolivar".to_string(),
            })
        );
    }
}
