pub mod stage2_crm;
pub mod stage3_duplicates;
pub mod stage4_blanks;
pub mod stage5_summary;
pub mod stage6_interpret;
pub mod stage7_report;
