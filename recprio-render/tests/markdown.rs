use recprio_domain::{PrioritizeResult, Prioritizer, PrioritizerConfig, Ruleset};
use recprio_records::parse_records;
use recprio_render::{MemoOptions, render_memo_md, render_summary_md};

fn run(json: &str) -> PrioritizeResult {
    let entries = parse_records("test", json).expect("parse");
    Prioritizer::new(Ruleset::builtin().expect("rules"), PrioritizerConfig::default())
        .prioritize(&entries)
}

const TABLE: &str = r#"[
    {"id": "qw-1", "sector": "labour", "year": 2024,
     "recommendation": "Report to all citizens on the unemployment guideline for small business."},
    {"id": "slow-1", "sector": "energy", "year": 2021,
     "recommendation": "Parliament should pass legislation to restructure Eskom with R20 billion in funding."}
]"#;

#[test]
fn summary_lists_counts_and_quick_wins() {
    let result = run(TABLE);
    let md = render_summary_md(&result.dataset, &result.summary);
    assert!(md.starts_with("# recprio summary\n"));
    assert!(md.contains("- Recommendations scored: 2\n"));
    assert!(md.contains("- Quick wins: 1\n"));
    assert!(md.contains("| labour | 1 | 1 |"));
    assert!(md.contains("### 1. LABOUR (2024)"));
    assert!(!md.contains("ENERGY (2021)"));
}

#[test]
fn empty_dataset_renders_placeholder() {
    let result = run("[]");
    let md = render_summary_md(&result.dataset, &result.summary);
    assert!(md.contains("_No recommendations scored._"));

    let memo = render_memo_md(&result.dataset, &result.summary, &MemoOptions::default());
    assert!(memo.contains("_No quick wins identified._"));
    assert!(memo.contains("_No high priority recommendations._"));
    assert!(memo.contains("_No theme recurs across three or more years._"));
}

#[test]
fn memo_has_every_part_and_truncates_text() {
    let result = run(TABLE);
    let opts = MemoOptions {
        text_limit: 20,
        ..MemoOptions::default()
    };
    let memo = render_memo_md(&result.dataset, &result.summary, &opts);
    assert!(memo.contains("**Total recommendations analysed:** 2"));
    assert!(memo.contains("**Reports covered:** 2021-2024"));
    assert!(memo.contains("## Part I: Immediate action priorities (quick wins)"));
    assert!(memo.contains("**1. LABOUR (2024)**"));
    assert!(memo.contains("- **Recommendation:** Report to all citize..."));
    assert!(memo.contains("## Part II: Sector-specific high priority reforms"));
    assert!(memo.contains("### LABOUR"));
    assert!(memo.contains("## Part III: Required institutional reforms"));
    assert!(memo.contains("## Part IV: Fiscal sequencing"));
}

#[test]
fn rendering_is_deterministic() {
    let result = run(TABLE);
    let a = render_memo_md(&result.dataset, &result.summary, &MemoOptions::default());
    let b = render_memo_md(&result.dataset, &result.summary, &MemoOptions::default());
    assert_eq!(a, b);
}
