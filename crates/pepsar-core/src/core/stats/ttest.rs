/// Result of a two-sample Welch t-test.
///
/// `p_less` is the left tail P(T <= t), `p_greater` the right tail. For a
/// degenerate input (either group smaller than two, or zero pooled variance)
/// every field is NaN; callers decide the neutral substitution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    pub statistic: f64,
    pub df: f64,
    pub p_less: f64,
    pub p_greater: f64,
}

impl TTest {
    fn degenerate() -> Self {
        Self {
            statistic: f64::NAN,
            df: f64::NAN,
            p_less: f64::NAN,
            p_greater: f64::NAN,
        }
    }
}

/// Two-sample t-test with unequal variances (Welch) and Welch–Satterthwaite
/// degrees of freedom.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> TTest {
    let na = a.len();
    let nb = b.len();
    if na < 2 || nb < 2 {
        return TTest::degenerate();
    }

    let mean_a = mean(a);
    let mean_b = mean(b);
    let var_a = sample_variance(a, mean_a);
    let var_b = sample_variance(b, mean_b);

    let sa = var_a / na as f64;
    let sb = var_b / nb as f64;
    let se2 = sa + sb;
    if se2 <= 0.0 {
        return TTest::degenerate();
    }

    let statistic = (mean_a - mean_b) / se2.sqrt();
    let df = se2 * se2 / (sa * sa / (na as f64 - 1.0) + sb * sb / (nb as f64 - 1.0));
    if !df.is_finite() {
        return TTest::degenerate();
    }

    let cdf = t_cdf(statistic, df);
    TTest {
        statistic,
        df,
        p_less: cdf.clamp(0.0, 1.0),
        p_greater: (1.0 - cdf).clamp(0.0, 1.0),
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0)
}

// Large df converges on the normal distribution; the incomplete beta below
// loses precision there anyway.
fn t_cdf(t: f64, df: f64) -> f64 {
    if df > 100.0 {
        return normal_cdf(t);
    }

    let x = df / (df + t * t);
    let ibeta = incomplete_beta(df / 2.0, 0.5, x);

    if t >= 0.0 { 1.0 - ibeta / 2.0 } else { ibeta / 2.0 }
}

fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    // Abramowitz & Stegun 7.1.26
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

fn gamma(x: f64) -> f64 {
    // Lanczos approximation
    if x < 0.5 {
        std::f64::consts::PI / ((std::f64::consts::PI * x).sin() * gamma(1.0 - x))
    } else {
        let x = x - 1.0;
        let g = 7_usize;
        let c = [
            0.99999999999980993,
            676.5203681218851,
            -1259.1392167224028,
            771.32342877765313,
            -176.61502916214059,
            12.507343278686905,
            -0.13857109526572012,
            9.9843695780195716e-6,
            1.5056327351493116e-7,
        ];

        let t = x + g as f64 + 0.5;
        let mut a = c[0];

        for (i, coeff) in c.iter().enumerate().skip(1) {
            a += coeff / (x + i as f64);
        }

        (2.0 * std::f64::consts::PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * a
    }
}

fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let bt = (gamma(a + b) / (gamma(a) * gamma(b))) * x.powf(a) * (1.0 - x).powf(b);

    if x < (a + 1.0) / (a + b + 2.0) {
        bt * betacf(a, b, x) / a
    } else {
        1.0 - bt * betacf(b, a, 1.0 - x) / b
    }
}

fn betacf(a: f64, b: f64, x: f64) -> f64 {
    // Continued fraction for the regularized incomplete beta
    let max_iter = 100;
    let eps = 1e-10;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;

    if d.abs() < 1e-30 {
        d = 1e-30;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=max_iter {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < 1e-30 {
            d = 1e-30;
        }
        c = 1.0 + aa / c;
        if c.abs() < 1e-30 {
            c = 1e-30;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < 1e-30 {
            d = 1e-30;
        }
        c = 1.0 + aa / c;
        if c.abs() < 1e-30 {
            c = 1e-30;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;

        if (del - 1.0).abs() < eps {
            break;
        }
    }

    h
}
