pub struct Icons;

impl Icons {
    pub const PACKAGE: &str = "📦";
    pub const CHECK: &str = "✅";
    pub const WARN: &str = "⚠️";
    pub const LINK: &str = "🔗";
    pub const STATS: &str = "📊";
    pub const STAR: &str = "⭐";
    pub const EMPTY: &str = "∅";
}
