use crate::pipeline::stage6_interpret::{
    BiasDirection, BlankMetrics, CrmMetrics, DuplicateMetrics, FailurePattern, NarrativeContext,
};
use crate::report::{format_f64, format_opt, format_pct};

pub fn render_narrative(ctx: &NarrativeContext) -> String {
    let mut out = String::new();

    let report_number = ctx.run.report_number.as_deref().unwrap_or(&ctx.run.file_name);
    let report_date = ctx.run.report_date.as_deref().unwrap_or("unknown");
    out.push_str(&format!(
        "QC Summary for {} (Report: {}, Date: {})\n",
        ctx.run.file_name, report_number, report_date
    ));
    if let Some(lab) = &ctx.run.lab_name {
        out.push_str(&format!("Laboratory: {}\n", lab));
    }
    if !ctx.run.names_match {
        out.push_str(&format!(
            "Note: file name '{}' does not match the certificate report number '{}'.\n",
            ctx.run.file_name, report_number
        ));
    }
    out.push('\n');

    out.push_str("1. Batch composition\n");
    out.push_str(&format!(
        "This batch includes {} QC samples: {} CRM runs ({} distinct materials), {} duplicate pairs and {} blanks.\n\n",
        ctx.counts.total_samples,
        ctx.counts.crm_samples,
        ctx.counts.crm_materials,
        ctx.counts.duplicate_pairs,
        ctx.counts.blank_samples
    ));

    out.push_str("2. Method context\n");
    out.push_str(&format!("{}\n\n", ctx.method_text));

    out.push_str("3. CRM behaviour\n");
    out.push_str(&format!(
        "CRM tolerance applied: {}-{}% recovery.\n",
        ctx.config.crm_low_tol, ctx.config.crm_high_tol
    ));
    out.push_str("Recovery % = Measured / Certified x 100\n");
    out.push_str("Bias % = (Measured - Certified) / Certified x 100\n");
    out.push_str(&format!(
        "{}\n\n",
        crm_statement(&ctx.crm, ctx.counts.crm_samples)
    ));

    out.push_str("4. Duplicate behaviour\n");
    out.push_str(&format!(
        "Duplicate tolerance applied: <= {}% RPD.\n",
        ctx.config.duplicate_rpd_tol
    ));
    out.push_str("RPD % = |S1 - S2| / ((S1 + S2) / 2) x 100\n");
    out.push_str(&format!(
        "{}\n",
        duplicate_statement(
            &ctx.duplicates,
            ctx.counts.duplicate_pairs,
            ctx.config.duplicate_rpd_tol
        )
    ));
    out.push_str(&format!("{}\n\n", ctx.matrix_text));

    out.push_str("5. Blank behaviour\n");
    out.push_str(&format!(
        "Blank tolerance applied: values > {}x DL flagged.\n",
        ctx.config.blank_tol_factor
    ));
    out.push_str(&format!(
        "BDL substitution rule applied: {}.\n",
        ctx.config.bdl_sub_rule
    ));
    out.push_str("Blank Mean = sum(x) / n; Blank SD = sqrt(sum((x - mean)^2) / (n - 1))\n");
    out.push_str(&format!(
        "{}\n",
        blank_statement(&ctx.blanks, ctx.counts.blank_samples)
    ));
    for g in &ctx.blanks.groups {
        out.push_str(&format!(
            "  {} ({}): n={}, mean={}, sd={}, threshold={}\n",
            g.analyte,
            g.unit,
            g.n,
            or_na(format_opt(g.mean, 4)),
            or_na(format_opt(g.sd, 4)),
            or_na(format_opt(g.threshold, 4))
        ));
    }
    out.push('\n');

    out.push_str(
        "Note: QC results reflect internal laboratory quality-control performance for this batch. \
         They highlight patterns that may warrant review and should be read alongside laboratory \
         documentation and project context.\n\n",
    );
    out.push_str("Status definitions:\n");
    out.push_str("- Pass: the QC metric is within the configured tolerance (bounds inclusive).\n");
    out.push_str("- Fail: the QC metric is outside the configured tolerance.\n");
    out.push_str(
        "- NotApplicable: the metric cannot be computed (missing field, zero denominator, or both duplicate values below DL).\n",
    );

    out
}

fn or_na(s: String) -> String {
    if s.is_empty() { "n/a".to_string() } else { s }
}

fn crm_statement(m: &CrmMetrics, crm_samples: usize) -> String {
    if crm_samples == 0 {
        return "The batch contains no CRM samples.".to_string();
    }
    if m.tally.evaluated() == 0 {
        return format!(
            "None of the {} CRM records could be evaluated ({} not applicable).",
            m.tally.total(),
            m.tally.not_applicable
        );
    }

    let mut out = format!(
        "{} of {} evaluated CRM records passed ({}); {} not applicable.",
        m.tally.pass,
        m.tally.evaluated(),
        format_pct(m.tally.pass_rate()),
        m.tally.not_applicable
    );
    if let Some(bias) = m.mean_bias {
        let direction = match m.bias_direction {
            BiasDirection::High => "recoveries tend high",
            BiasDirection::Low => "recoveries tend low",
            BiasDirection::Neutral => "no systematic bias",
        };
        out.push_str(&format!(
            "\nMean bias: {}% ({}).",
            format_f64(bias, 1),
            direction
        ));
    }

    if m.tally.fail == 0 {
        out.push_str(
            "\nAll evaluated CRM recoveries fall within tolerance, indicating stable digestion \
             and consistent calibration.",
        );
        return out;
    }

    out.push_str(&format!(
        "\n{} analyte-level deviations across {} CRM runs:",
        m.tally.fail, crm_samples
    ));
    for f in &m.failures_by_analyte {
        if f.count == 1 {
            out.push_str(&format!("\n  - {}: {}%", f.analyte, format_f64(f.min, 1)));
        } else {
            out.push_str(&format!(
                "\n  - {}: {}-{}% ({} runs)",
                f.analyte,
                format_f64(f.min, 1),
                format_f64(f.max, 1),
                f.count
            ));
        }
    }
    let pattern = match m.pattern {
        FailurePattern::SingleCrm => {
            "The deviations come from a single CRM material, which often reflects \
             CRM-specific behaviour (matrix mismatch or certified value uncertainty) rather \
             than a batch-wide issue."
                .to_string()
        }
        FailurePattern::MultiCrm => format!(
            "The deviations occur across {} different CRMs, which may indicate method-level \
             effects such as digestion inefficiency, calibration drift or interference bias.",
            m.failing_materials
        ),
        FailurePattern::None => String::new(),
    };
    if !pattern.is_empty() {
        out.push_str(&format!("\n{}", pattern));
    }
    out
}

fn duplicate_statement(m: &DuplicateMetrics, pairs: usize, rpd_tol: f64) -> String {
    if pairs == 0 {
        return "No duplicate samples were included, so precision could not be evaluated."
            .to_string();
    }
    if m.tally.evaluated() == 0 {
        return format!(
            "{} duplicate pairs were present but none could be evaluated (values below \
             detection or missing).",
            pairs
        );
    }

    let mut out = format!(
        "{} of {} evaluated duplicate records passed ({}).",
        m.tally.pass,
        m.tally.evaluated(),
        format_pct(m.tally.pass_rate())
    );
    if m.tally.fail > 0 {
        out.push_str(&format!(
            "\n{} records exceed the {}% RPD threshold, which may reflect sample \
             heterogeneity, low-grade variability or precision limits:",
            m.tally.fail, rpd_tol
        ));
        for f in &m.failed {
            out.push_str(&format!("\n  - {}", f));
        }
    }
    if m.substituted > 0 {
        out.push_str(&format!(
            "\n{} pairs had one value below detection and were evaluated with the substituted value.",
            m.substituted
        ));
    }
    if m.tally.not_applicable > 0 {
        out.push_str(&format!(
            "\nAn additional {} records were not applicable and were excluded from precision evaluation.",
            m.tally.not_applicable
        ));
    }
    out
}

fn blank_statement(m: &BlankMetrics, blank_samples: usize) -> String {
    if blank_samples == 0 {
        return "The batch contains no blank samples.".to_string();
    }
    if m.tally.evaluated() == 0 {
        return format!(
            "None of the {} blank records could be evaluated.",
            m.tally.total()
        );
    }
    if m.tally.fail == 0 {
        return format!(
            "All {} evaluated blank records are within threshold (exceedance rate {}), \
             showing no evidence of contamination or carryover.",
            m.tally.evaluated(),
            format_pct(m.tally.fail_rate())
        );
    }
    let mut out = format!(
        "{} of {} evaluated blank records exceed threshold (exceedance rate {}), suggesting \
         possible low-level contamination, memory effects or carryover:",
        m.tally.fail,
        m.tally.evaluated(),
        format_pct(m.tally.fail_rate())
    );
    for f in &m.failed {
        out.push_str(&format!("\n  - {}", f));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
