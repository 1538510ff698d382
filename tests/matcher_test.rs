use paper_hype::matcher::{self, TopicMatcher};
use paper_hype::topics::{self, Topic};
use paper_hype::PaperText;
use std::collections::HashSet;

fn keywords(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

// --- relevance scale ---

#[test]
fn relevance_zero_for_empty_keyword_set() {
    assert_eq!(matcher::relevance("Some title", "Some abstract", keywords(&[])), 0.0);
}

#[test]
fn relevance_zero_when_nothing_matches() {
    assert_eq!(matcher::relevance("Graph cuts", "min-cut", keywords(&["diffusion"])), 0.0);
}

#[test]
fn relevance_counts_distinct_keywords_once() {
    assert_eq!(matcher::relevance("GAN GAN GAN", "", keywords(&["gan"])), 2.0);
}

#[test]
fn relevance_is_case_insensitive() {
    assert_eq!(
        matcher::relevance("TRANSFORMER", "ATTENTION", keywords(&["transformer", "attention"])),
        4.0
    );
}

#[test]
fn relevance_range_holds_for_large_keyword_sets() {
    let words: Vec<String> = (0..50).map(|i| format!("kw{}", i)).collect();
    let text = words.join(" ");
    let r = matcher::relevance(&text, &text, &words);
    assert_eq!(r, 10.0);
}

#[test]
fn three_hits_is_a_match_two_is_not() {
    let m = TopicMatcher::default();
    let kws = keywords(&["a", "b", "c"]);
    assert!(m.is_match(m.relevance("a", "b c", &kws)));
    assert!(!m.is_match(m.relevance("a", "b", &kws)));
}

#[test]
fn substring_false_positive_is_kept() {
    assert_eq!(matcher::relevance("Organism growth", "", keywords(&["gan"])), 2.0);
}

// --- topics ---

#[test]
fn neural_rendering_topic_matches_nerf_paper() {
    let topic = Topic::new(
        "neural rendering",
        ["nerf", "neural radiance fields", "view synthesis", "novel view"],
        false,
    )
    .unwrap();
    let text = PaperText::new(
        "Neural Radiance Fields for View Synthesis",
        "We present NeRF ... novel view synthesis...",
    );
    let result = TopicMatcher::default().score_topic(&text, &topic);
    assert!(result.relevance >= 6.0);
    assert!(result.is_match);
}

#[test]
fn system_catalogue_neural_rendering_matches_same_paper() {
    let all = topics::system_topics();
    let text = PaperText::new(
        "Neural Radiance Fields for View Synthesis",
        "We present NeRF ... novel view synthesis...",
    );
    let best = TopicMatcher::default().best_topic(&text, &all).unwrap();
    assert_eq!(best.topic, "neural rendering");
    assert!(best.is_match);
}

#[test]
fn paper_can_match_several_topics() {
    let all = vec![
        Topic::new("diffusion models", ["diffusion", "denoising", "text-to-image"], false).unwrap(),
        Topic::new(
            "image synthesis",
            ["image synthesis", "text-to-image", "autoencoder"],
            false,
        )
        .unwrap(),
        Topic::new("robotics", ["robot", "grasp"], false).unwrap(),
    ];
    let text = PaperText::new(
        "High-Resolution Image Synthesis with Latent Diffusion Models",
        "denoising autoencoders achieve text-to-image synthesis",
    );
    let rows = TopicMatcher::default().matches_for_paper("2112.10752", &text, &all);
    let ids: Vec<&str> = rows.iter().map(|r| r.topic_id.as_str()).collect();
    assert_eq!(ids, vec!["diffusion models", "image synthesis"]);
}

#[test]
fn empty_paper_text_matches_nothing() {
    let all = topics::system_topics();
    let rows = TopicMatcher::default().matches_for_paper("p", &PaperText::default(), &all);
    assert!(rows.is_empty());
}
