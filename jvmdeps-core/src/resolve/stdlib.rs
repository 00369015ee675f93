use jvmdeps_common::model::Language;
use jvmdeps_common::naming::PackageName;

/// Packages shipped with the JDK. Matched on whole segments.
const JAVA_STDLIB_PREFIXES: &[&str] = &[
    "com.sun.management",
    "com.sun.net.httpserver",
    "java",
    "javax.annotation.security",
    "javax.crypto",
    "javax.management",
    "javax.naming",
    "javax.net",
    "javax.security",
    "javax.xml",
    "jdk",
    "org.w3c.dom",
    "org.xml.sax",
    "sun",
];

const KOTLIN_STDLIB_PREFIX: &str = "kotlin";

/// True when `pkg` comes with the language runtime and needs no dependency.
pub fn is_stdlib(pkg: &PackageName, language: Language) -> bool {
    let has_prefix = |prefix: &str| pkg.has_prefix(&PackageName::new(prefix));
    JAVA_STDLIB_PREFIXES.iter().any(|prefix| has_prefix(prefix))
        || (language == Language::Kotlin && has_prefix(KOTLIN_STDLIB_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jdk_packages_are_stdlib() {
        for pkg in ["java.util", "java.util.concurrent", "javax.xml.parsers", "org.w3c.dom", "sun.misc"] {
            assert!(is_stdlib(&PackageName::new(pkg), Language::Java), "{pkg}");
        }
    }

    #[test]
    fn lookalike_packages_are_not_stdlib() {
        for pkg in ["javax.inject", "javafoo.bar", "com.sun.jersey", "org.xml.saxon"] {
            assert!(!is_stdlib(&PackageName::new(pkg), Language::Java), "{pkg}");
        }
    }

    #[test]
    fn kotlin_prefix_only_applies_to_kotlin_sources() {
        let pkg = PackageName::new("kotlin.collections");
        assert!(is_stdlib(&pkg, Language::Kotlin));
        assert!(!is_stdlib(&pkg, Language::Java));
        assert!(!is_stdlib(&PackageName::new("kotlinx.coroutines"), Language::Kotlin));
    }
}
