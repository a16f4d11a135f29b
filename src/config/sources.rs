//! Built-in source registry.

use crate::domain::{Layer, SourceDescriptor};

pub fn default_sources() -> Vec<SourceDescriptor> {
    use SourceDescriptor as S;

    vec![
        // Trade + runway
        S::feed("https://www.vogue.com/feed/rss", "Vogue Runway", Layer::L1, "Runway Signal", 8),
        S::feed(
            "https://www.dezeen.com/design/fashion/feed/",
            "Dezeen Fashion",
            Layer::L1,
            "Material Innovation",
            6,
        ),
        S::feed(
            "https://www.sportswear-international.com/rss",
            "Sportswear International",
            Layer::L1,
            "Activewear Trade",
            6,
        ),
        // Subculture
        S::feed("https://www.kerrang.com/rss", "Kerrang", Layer::L2, "Music + Merch", 8),
        S::feed(
            "https://metalinjection.net/feed",
            "Metal Injection",
            Layer::L2,
            "Metal Visual Culture",
            8,
        ),
        S::feed(
            "https://www.revolvermag.com/rss.xml",
            "Revolver Magazine",
            Layer::L2,
            "Heavy Music Visual",
            6,
        ),
        S::feed(
            "https://daily.bandcamp.com/feed",
            "Bandcamp Daily",
            Layer::L2,
            "Underground Signal",
            6,
        ),
        S::feed(
            "https://www.itsnicethat.com/rss",
            "It's Nice That",
            Layer::L2,
            "Illustration + Graphic Design",
            8,
        ),
        // Market + culture
        S::feed("https://hypebeast.com/feed", "Hypebeast", Layer::L3, "Streetwear Culture", 10),
        S::feed(
            "https://www.highsnobiety.com/feed/",
            "Highsnobiety",
            Layer::L3,
            "Premium Streetwear",
            10,
        ),
        S::feed(
            "https://www.complex.com/rss/style",
            "Complex Style",
            Layer::L3,
            "Urban Culture",
            8,
        ),
        S::feed("https://www.gq.com/feed/rss", "GQ", Layer::L3, "Mainstream Menswear", 6),
        S::page(
            "https://www.acclaimmagazine.com/category/style/",
            "Acclaim Magazine",
            Layer::L3,
            "AU Streetwear",
            6,
        ),
        S::feed("https://news.nike.com/feed", "Nike News", Layer::L3, "Performance Direction", 6),
        // Competitor + retail
        S::feed(
            "https://blog.gymshark.com/rss.xml",
            "Gymshark Blog",
            Layer::L4,
            "Gym Competitor",
            8,
        ),
        S::feed(
            "https://www.endclothing.com/au/journal/rss",
            "END Clothing",
            Layer::L4,
            "Premium AU Retail",
            8,
        ),
        S::feed(
            "https://blog.culturekings.com.au/feed",
            "Culture Kings",
            Layer::L4,
            "Direct AU Competitor",
            8,
        ),
        S::page(
            "https://www.grailed.com/drycleanonly",
            "Grailed Editorial",
            Layer::L4,
            "Resale Value Signal",
            6,
        ),
        S::page(
            "https://www.doverstreetmarket.com/magazine",
            "Dover Street Market",
            Layer::L4,
            "Highest Signal Retail",
            6,
        ),
        S::feed(
            "https://www.businessoffashion.com/rss/news",
            "Business of Fashion",
            Layer::L4,
            "Industry Intelligence",
            6,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceKind;
    use std::collections::HashSet;

    #[test]
    fn test_registry_shape() {
        let sources = default_sources();
        assert_eq!(sources.len(), 20);
        assert_eq!(
            sources.iter().filter(|s| s.kind == SourceKind::Page).count(),
            3
        );
        assert!(sources.iter().all(|s| s.quota > 0));
    }

    #[test]
    fn test_registry_endpoints_unique() {
        let sources = default_sources();
        let endpoints: HashSet<_> = sources.iter().map(|s| s.endpoint.as_str()).collect();
        assert_eq!(endpoints.len(), sources.len());
    }

    #[test]
    fn test_every_layer_covered() {
        let layers: HashSet<_> = default_sources().iter().map(|s| s.layer).collect();
        assert_eq!(layers.len(), 4);
    }
}
