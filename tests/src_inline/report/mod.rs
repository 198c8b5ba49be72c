use super::*;

#[test]
fn test_mean_and_sd() {
    assert_eq!(mean(&[]), None);
    assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    assert_eq!(sample_std_dev(&[1.0]), None);
    assert_eq!(sample_std_dev(&[]), None);
    let sd = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
    assert!((sd - 2.138_089_935).abs() < 1e-8);
}

#[test]
fn test_formatting() {
    assert_eq!(format_f64(1.23456, 2), "1.23");
    assert_eq!(format_opt(None, 3), "");
    assert_eq!(format_opt(Some(f64::NAN), 3), "");
    assert_eq!(format_opt(Some(0.5), 3), "0.500");
    assert_eq!(format_pct(Some(0.875)), "87.5%");
    assert_eq!(format_pct(None), "n/a");
}
