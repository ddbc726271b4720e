/// municipalities of the northern border region taxed at the reduced IVA rate.
/// partial list; a production deployment should source the official catalogue.
pub const BORDER_MUNICIPALITIES: &[&str] = &[
    // baja california
    "TIJUANA",
    "MEXICALI",
    "TECATE",
    "ENSENADA",
    "PLAYAS DE ROSARITO",
    // sonora
    "NOGALES",
    "AGUA PRIETA",
    "SAN LUIS RIO COLORADO",
    // chihuahua
    "JUAREZ",
    "OJINAGA",
    "ASCENSION",
    // coahuila
    "PIEDRAS NEGRAS",
    "ACUÑA",
    // nuevo leon
    "ANAHUAC",
    // tamaulipas
    "NUEVO LAREDO",
    "REYNOSA",
    "MATAMOROS",
    "RIO BRAVO",
    "VALLE HERMOSO",
];

/// case and surrounding-whitespace insensitive lookup
pub fn is_border_municipality(name: &str) -> bool {
    let normalized = name.trim().to_uppercase();
    BORDER_MUNICIPALITIES.iter().any(|m| *m == normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_municipalities() {
        assert!(is_border_municipality("Tijuana"));
        assert!(is_border_municipality("  nuevo laredo "));
        assert!(is_border_municipality("Acuña"));
    }

    #[test]
    fn test_interior_municipalities() {
        assert!(!is_border_municipality("Guadalajara"));
        assert!(!is_border_municipality(""));
    }
}
