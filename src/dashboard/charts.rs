//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations for the selected time range:
//! - **Income vs Expense**: Daily income and expense totals side by side
//! - **Categories**: Expense and income totals per category as two pie charts
//! - **Balance Over Time**: Running balance at the end of each day
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, ItemStyle, JsFunction, Tooltip,
        Trigger,
    },
    series::{Line, Pie, bar},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    dashboard::aggregation::{CategoryTotal, category_totals, daily_totals, running_balance},
    html::HeadElement,
    transaction::{Transaction, TransactionKind},
};

const INCOME_COLOR: &str = "#22c55e";
const EXPENSE_COLOR: &str = "#ef4444";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Builds the three dashboard charts from the transactions in the selected range.
pub(super) fn build_charts(transactions: &[&Transaction]) -> Vec<DashboardChart> {
    vec![
        DashboardChart {
            id: "income-expense-chart",
            options: script_safe_json(&income_expense_chart(transactions)),
        },
        DashboardChart {
            id: "categories-chart",
            options: script_safe_json(&categories_chart(transactions)),
        },
        DashboardChart {
            id: "balance-chart",
            options: script_safe_json(&balance_chart(transactions)),
        },
    ]
}

/// Serializes `chart` for embedding in an inline `<script>`.
///
/// User text such as category names ends up in JSON strings, so `<` is
/// written as its unicode escape to stop `</script>` from closing the tag.
fn script_safe_json(chart: &Chart) -> String {
    chart.to_string().replace('<', "\\u003c")
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        div class="grid grid-cols-1 gap-4"
        {
            @for chart in charts {
                div
                    id=(chart.id)
                    class="min-h-[380px] rounded dark:bg-gray-100"
                {}
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    if (!chartDom) {{ return; }}
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});"
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

fn income_expense_chart(transactions: &[&Transaction]) -> Chart {
    let totals = daily_totals(transactions);
    let labels: Vec<String> = totals.iter().map(|total| total.label.clone()).collect();
    let income: Vec<f64> = totals.iter().map(|total| total.income).collect();
    let expense: Vec<f64> = totals.iter().map(|total| total.expense).collect();

    Chart::new()
        .title(Title::new().text("Income vs Expense"))
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("1%").right("4%"))
        .grid(standard_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            bar::Bar::new()
                .name("Income")
                .item_style(ItemStyle::new().color(INCOME_COLOR))
                .data(income),
        )
        .series(
            bar::Bar::new()
                .name("Expense")
                .item_style(ItemStyle::new().color(EXPENSE_COLOR))
                .data(expense),
        )
}

fn pie_data(totals: &[CategoryTotal], kind: TransactionKind) -> Vec<(f64, &str)> {
    totals
        .iter()
        .filter(|total| total.kind == kind)
        .map(|total| (total.value, total.name.as_str()))
        .collect()
}

fn categories_chart(transactions: &[&Transaction]) -> Chart {
    let totals = category_totals(transactions);

    Chart::new()
        .title(Title::new().text("Categories"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .series(
            Pie::new()
                .name("Expenses")
                .radius("45%")
                .center(vec!["30%", "55%"])
                .data(pie_data(&totals, TransactionKind::Expense)),
        )
        .series(
            Pie::new()
                .name("Income")
                .radius("45%")
                .center(vec!["70%", "55%"])
                .data(pie_data(&totals, TransactionKind::Income)),
        )
}

fn balance_chart(transactions: &[&Transaction]) -> Chart {
    let points = running_balance(transactions);
    let labels: Vec<String> = points.iter().map(|point| point.label.clone()).collect();
    let values: Vec<f64> = points.iter().map(|point| point.balance).collect();

    Chart::new()
        .title(Title::new().text("Balance Over Time"))
        .tooltip(currency_tooltip())
        .grid(standard_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Line::new().name("Balance").data(values))
}

fn standard_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .contain_label(true)
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        html::HeadElement,
        transaction::{Transaction, TransactionId, TransactionKind},
    };

    use super::{build_charts, charts_script};

    #[test]
    fn builds_three_charts_with_expected_ids() {
        let transactions = vec![Transaction {
            id: TransactionId::new_unchecked("a"),
            description: "Salary".to_owned(),
            amount: 1000.0,
            kind: TransactionKind::Income,
            date: date!(2024 - 06 - 01),
            category: Some("Work".to_owned()),
        }];
        let refs: Vec<_> = transactions.iter().collect();

        let charts = build_charts(&refs);

        let ids: Vec<_> = charts.iter().map(|chart| chart.id).collect();
        assert_eq!(
            ids,
            vec!["income-expense-chart", "categories-chart", "balance-chart"]
        );
        assert!(charts[0].options.contains("Income vs Expense"));
        assert!(charts[1].options.contains("Work"));
        assert!(charts[2].options.contains("Jun 1"));
    }

    #[test]
    fn category_names_cannot_close_the_script_tag() {
        let transactions = vec![Transaction {
            id: TransactionId::new_unchecked("a"),
            description: "Snacks".to_owned(),
            amount: 4.0,
            kind: TransactionKind::Expense,
            date: date!(2024 - 06 - 01),
            category: Some("</script><script>alert(1)</script>".to_owned()),
        }];
        let refs: Vec<_> = transactions.iter().collect();

        let charts = build_charts(&refs);
        let HeadElement::ScriptSource(script) = charts_script(&charts) else {
            panic!("expected an inline script");
        };

        assert!(!script.0.contains("</script>"));
        assert!(!script.0.contains('<'));
        assert!(charts[1].options.contains("\\u003c/script>"));
    }
}
