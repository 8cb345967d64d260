//! Industry content packs
//!
//! Static domain vocabulary injected into scaffolds and prompts: product
//! names, compliance constraints, jargon, skills, and ticket topic
//! fragments. Unknown industries fall back to a generic pack.

/// Static content for one industry
#[derive(Debug, Clone)]
pub struct IndustryPack {
    /// Pack identifier
    pub name: &'static str,
    /// Product names; planning derives epics from these
    pub products: &'static [&'static str],
    /// Industry constraints woven into descriptions
    pub constraints: &'static [&'static str],
    /// Domain jargon for prompts
    pub jargon: &'static [&'static str],
    /// Technical skills pool for the roster
    pub skills: &'static [&'static str],
    /// Story topic fragments: features and surfaces
    pub features: &'static [&'static str],
    /// Story topic fragments: delivery surfaces
    pub surfaces: &'static [&'static str],
    /// Bug topic fragments: failure modes
    pub issues: &'static [&'static str],
    /// Bug topic fragments: components
    pub components: &'static [&'static str],
}

const FINTECH_SAAS: IndustryPack = IndustryPack {
    name: "fintech_saas",
    products: &[
        "Digital Payment Gateway",
        "KYC Verification Platform",
        "Fraud Detection Engine",
        "SME Banking API Suite",
        "Transaction Monitoring Dashboard",
    ],
    constraints: &[
        "RBI compliance requirements",
        "PCI DSS security standards",
        "real-time transaction processing demands",
        "99.9% uptime SLA requirements",
        "multi-currency support complexity",
    ],
    jargon: &[
        "TPS", "success rate", "settlement", "chargeback", "reconciliation", "fraud score",
        "mandate", "payout", "webhook", "idempotency key",
    ],
    skills: &[
        "Java", "Python", "TypeScript", "Go", "Spring Boot", "React", "PostgreSQL", "MongoDB",
        "Redis", "Kafka", "AWS", "Kubernetes", "Docker", "Terraform", "Payment APIs", "KYC",
        "Fraud Detection", "UPI APIs",
    ],
    features: &[
        "webhook validation", "retry mechanism", "rate limiting", "fraud scoring",
        "settlement batching", "mandate renewal",
    ],
    surfaces: &["UPI", "Net Banking", "Credit Card", "Wallet"],
    issues: &[
        "timeout handling", "validation error", "callback failure", "status mismatch",
        "duplicate capture",
    ],
    components: &[
        "payment gateway", "KYC service", "notification service", "dashboard",
        "reconciliation job",
    ],
};

const GENERIC: IndustryPack = IndustryPack {
    name: "generic",
    products: &["Software Platform", "API Service", "Data Analytics", "Web Application"],
    constraints: &[
        "security requirements",
        "scalability needs",
        "performance targets",
        "budget limitations",
    ],
    jargon: &["latency", "throughput", "uptime", "error budget", "rollout"],
    skills: &[
        "Python", "Java", "TypeScript", "React", "PostgreSQL", "MongoDB", "Redis", "AWS",
        "Docker", "Kubernetes",
    ],
    features: &["input validation", "caching layer", "audit logging", "bulk export"],
    surfaces: &["web", "mobile", "API", "admin console"],
    issues: &["timeout handling", "validation error", "race condition", "memory leak"],
    components: &["API service", "worker queue", "frontend", "scheduler"],
};

/// Look up the pack for an industry name
///
/// Accepts the canonical name and common aliases; anything else gets the
/// generic pack.
#[must_use]
pub fn pack_for(industry: &str) -> &'static IndustryPack {
    match industry.to_lowercase().as_str() {
        "fintech_saas" | "fintech" | "fintech saas" => &FINTECH_SAAS,
        _ => &GENERIC,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fintech_aliases_resolve() {
        assert_eq!(pack_for("fintech_saas").name, "fintech_saas");
        assert_eq!(pack_for("Fintech SaaS").name, "fintech_saas");
        assert_eq!(pack_for("fintech").name, "fintech_saas");
    }

    #[test]
    fn unknown_industry_falls_back() {
        assert_eq!(pack_for("biotech").name, "generic");
    }

    #[test]
    fn packs_carry_topic_fragments() {
        let pack = pack_for("fintech");
        assert!(!pack.products.is_empty());
        assert!(!pack.features.is_empty());
        assert!(!pack.issues.is_empty());
        assert!(!pack.skills.is_empty());
    }
}
