#![allow(dead_code)]

use std::fmt::Write;

/// `b0 -> b1 -> ... -> bN-1`, alternating read and video blocks.
pub fn build_linear_journey(block_count: usize) -> String {
    let block_count = block_count.max(1);
    let mut yaml = String::new();
    writeln!(&mut yaml, "startBlockId: b0").ok();
    writeln!(&mut yaml, "blocks:").ok();
    for i in 0..block_count {
        let kind = if i % 2 == 0 { "read" } else { "video" };
        writeln!(&mut yaml, "  - id: b{}", i).ok();
        writeln!(&mut yaml, "    type: {}", kind).ok();
        writeln!(&mut yaml, "    content: {{ title: Block {} }}", i).ok();
    }
    writeln!(&mut yaml, "edges:").ok();
    if block_count == 1 {
        yaml.push_str("  []\n");
    }
    for i in 1..block_count {
        writeln!(&mut yaml, "  - {{ from: b{}, to: b{} }}", i - 1, i).ok();
    }
    yaml
}

/// A quiz fanning out to `branch_count` score bands, each leading to a
/// shared checkpoint. Band `k` matches `scorePercent >= k * step`; higher
/// bands have lower priority numbers so they are tried first.
pub fn build_branch_journey(branch_count: usize) -> String {
    let branch_count = branch_count.max(1);
    let step = 100.0 / branch_count as f64;
    let mut yaml = String::new();
    writeln!(&mut yaml, "startBlockId: quiz").ok();
    writeln!(&mut yaml, "blocks:").ok();
    writeln!(&mut yaml, "  - id: quiz").ok();
    writeln!(&mut yaml, "    type: quiz").ok();
    writeln!(&mut yaml, "    content:").ok();
    writeln!(&mut yaml, "      passingScore: 50").ok();
    writeln!(&mut yaml, "      questions:").ok();
    writeln!(&mut yaml, "        - {{ id: q1, options: [a, b], correctOption: 0 }}").ok();
    for k in 0..branch_count {
        writeln!(&mut yaml, "  - {{ id: band{}, type: read }}", k).ok();
    }
    writeln!(&mut yaml, "  - {{ id: done, type: checkpoint }}").ok();

    writeln!(&mut yaml, "edges:").ok();
    for k in 0..branch_count {
        writeln!(&mut yaml, "  - from: quiz").ok();
        writeln!(&mut yaml, "    to: band{}", k).ok();
        writeln!(&mut yaml, "    priority: {}", branch_count - k).ok();
        writeln!(&mut yaml, "    condition:").ok();
        writeln!(&mut yaml, "      all:").ok();
        writeln!(&mut yaml, "        - fact: quiz.scorePercent").ok();
        writeln!(&mut yaml, "          op: gte").ok();
        writeln!(&mut yaml, "          value: {}", k as f64 * step).ok();
        writeln!(&mut yaml, "  - {{ from: band{}, to: done }}", k).ok();
    }
    yaml
}
