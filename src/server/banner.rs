// Startup banner
// Printed once by the server binary before it starts listening

use colored::*;

/// What the banner reports about the running instance
#[derive(Debug, Clone)]
pub struct BannerInfo {
    pub store: String,
    pub host: String,
    pub port: u16,
    pub graphiql: bool,
}

/// Render the banner lines, without printing them
pub fn render(info: &BannerInfo) -> Vec<String> {
    let base = format!("http://localhost:{}", info.port);
    let mut lines = vec![
        format!(
            "{} {}",
            "🦸 Hero Service".green().bold(),
            format!("v{}", env!("CARGO_PKG_VERSION")).yellow()
        ),
        format!("  Store:    {}", info.store.cyan()),
        format!("  Listen:   {}:{}", info.host, info.port),
        format!("  REST:     {}/api/heroes", base),
        format!("  GraphQL:  {}/graphql", base),
    ];
    if info.graphiql {
        lines.push(format!("  GraphiQL: {}/graphql {}", base, "(GET)".dimmed()));
    }
    lines
}

pub fn print(info: &BannerInfo) {
    for line in render(info) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_mentions_endpoints() {
        colored::control::set_override(false);
        let lines = render(&BannerInfo {
            store: "memory".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            graphiql: false,
        });

        assert!(lines[0].contains(env!("CARGO_PKG_VERSION")));
        assert!(lines.iter().any(|l| l.contains("http://localhost:8080/api/heroes")));
        assert!(!lines.iter().any(|l| l.contains("GraphiQL")));
    }
}
