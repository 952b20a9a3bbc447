use std::collections::BTreeMap;

use crate::{
    Broker, Engine, Period, RatesProvider, Repo, Report, ReportRow, ResultEngine, currency,
    parse::{DATE_FORMAT, format_sum},
};

impl<R, X, B> Engine<R, X, B>
where
    R: Repo,
    X: RatesProvider,
    B: Broker,
{
    /// Aggregates the user's purchases over `period` into per-category
    /// subtotals and a grand total in the user's display currency.
    ///
    /// Categories are sorted by name for determinism; an empty period
    /// yields a report with all-zero totals, not an error. The finished
    /// series is published on the side channel best-effort.
    pub async fn report(&self, user_id: i64, period: Period) -> ResultEngine<Report> {
        self.repo.create_user_if_absent(user_id).await?;
        let user = self.repo.user_info(user_id).await?;
        let purchases = self
            .repo
            .purchases_in_range(user_id, period.from, period.to)
            .await?;

        // BTreeMap keeps the per-category rows name-sorted.
        let mut per_category: BTreeMap<String, f64> = BTreeMap::new();
        let mut total = 0.0;
        for purchase in &purchases {
            let amount = currency::from_rub(purchase.sum_rub, user.currency, &purchase.rates);
            *per_category.entry(purchase.category.clone()).or_insert(0.0) += amount;
            total += amount;
        }

        let rows: Vec<ReportRow> = per_category
            .into_iter()
            .map(|(category, subtotal)| ReportRow {
                category,
                total: subtotal,
            })
            .collect();

        let report = Report {
            text: render_text(&period, &rows, total, user.currency.code()),
            rows,
            total,
            currency: user.currency,
        };

        self.publish_series(user_id, &report).await;
        Ok(report)
    }

    async fn publish_series(&self, user_id: i64, report: &Report) {
        let payload = match serde_json::to_string(&report.rows) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!("report series for {user_id} not serializable: {err}");
                return;
            }
        };
        if let Err(err) = self.broker.publish(&user_id.to_string(), &payload).await {
            tracing::warn!("report publish for {user_id} failed: {err}");
        }
    }
}

fn render_text(period: &Period, rows: &[ReportRow], total: f64, code: &str) -> String {
    let mut text = format!(
        "Expenses from {} to {}:\n",
        period.from.format(DATE_FORMAT),
        period.to.format(DATE_FORMAT)
    );
    for row in rows {
        text.push_str(&format!(
            "{}: {} {}\n",
            row.category,
            format_sum(row.total),
            code
        ));
    }
    text.push_str(&format!("Total: {} {}", format_sum(total), code));
    text
}
