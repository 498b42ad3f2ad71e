// src/services/dashboard_service.rs

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::dashboard::{
        BestSellingProduct, DashboardReport, DashboardRows, RecentTransaction, ReportWindows,
        SalesChartEntry, SalesChartRow,
    },
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    // Calcula o relatório do dashboard para o instante `now` informado pelo
    // chamador. Nada aqui lê o relógio: com o mesmo `now` e o mesmo banco,
    // o resultado é sempre o mesmo. Qualquer falha de leitura aborta o
    // cálculo inteiro; nunca devolvemos relatório parcial.
    pub async fn compute_report(&self, now: NaiveDateTime) -> Result<DashboardReport, AppError> {
        let windows = ReportWindows::from_now(now);
        let rows = self.repo.fetch_dashboard_rows(&windows).await?;
        Ok(assemble_report(&windows, rows))
    }
}

// Montagem pura do relatório a partir das linhas cruas
fn assemble_report(windows: &ReportWindows, rows: DashboardRows) -> DashboardReport {
    DashboardReport {
        today_sales: rows.today.total,
        today_transactions: rows.today.count,
        total_products_sold: rows.products_sold_today,
        recent_transactions: rows
            .recent
            .into_iter()
            .map(|r| RecentTransaction {
                id: r.id,
                total_amount: r.total_amount,
                items_count: r.items_count,
                created_at: r.created_at,
                status: r.status,
            })
            .collect(),
        monthly_revenue: rows.monthly_revenue,
        weekly_revenue: rows.weekly_revenue,
        sales_growth: sales_growth(rows.monthly_revenue, rows.previous_month_revenue),
        total_customers: rows.total_customers,
        best_selling_products: rows
            .best_selling
            .into_iter()
            .map(|r| BestSellingProduct {
                name: r.name,
                total_quantity: r.total_quantity,
                total_sales: r.total_sales,
            })
            .collect(),
        sales_chart_data: zero_filled_chart(windows.chart_first_day(), &rows.chart),
    }
}

// Crescimento percentual do mês corrente sobre o anterior.
// Por contrato, 0 quando o mês anterior não teve receita.
fn sales_growth(monthly: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return Decimal::ZERO;
    }
    (monthly - previous) / previous * Decimal::ONE_HUNDRED
}

// Expande as linhas agrupadas do banco em uma série fixa de 7 pontos,
// em ordem ascendente de data, preenchendo com zero os dias sem venda.
// O front-end do gráfico assume sempre 7 pontos.
fn zero_filled_chart(first_day: NaiveDate, rows: &[SalesChartRow]) -> Vec<SalesChartEntry> {
    (0..7)
        .map(|offset| {
            let day = first_day + Duration::days(offset);
            match rows.iter().find(|r| r.date == day) {
                Some(row) => SalesChartEntry {
                    date: chart_label(day),
                    sales: row.total,
                    transactions: row.transactions,
                },
                None => SalesChartEntry {
                    date: chart_label(day),
                    sales: Decimal::ZERO,
                    transactions: 0,
                },
            }
        })
        .collect()
}

// Rótulo no formato "29 Aug", o mesmo que o gráfico sempre recebeu
fn chart_label(day: NaiveDate) -> String {
    day.format("%d %b").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dashboard::{RecentTransactionRow, TodayStatsRow};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn empty_rows() -> DashboardRows {
        DashboardRows {
            today: TodayStatsRow { total: Decimal::ZERO, count: 0 },
            products_sold_today: 0,
            chart: vec![],
            monthly_revenue: Decimal::ZERO,
            weekly_revenue: Decimal::ZERO,
            previous_month_revenue: Decimal::ZERO,
            total_customers: 0,
            best_selling: vec![],
            recent: vec![],
        }
    }

    #[test]
    fn windows_cover_the_calendar_day_of_now() {
        let w = ReportWindows::from_now(dt(2026, 8, 29, 15, 30));

        assert_eq!(w.today_start, dt(2026, 8, 29, 0, 0));
        assert_eq!(w.today_end, dt(2026, 8, 30, 0, 0));
        assert_eq!(w.chart_start, dt(2026, 8, 23, 0, 0));
        assert_eq!(w.chart_end, dt(2026, 8, 30, 0, 0));
        assert_eq!(w.month_start, dt(2026, 8, 1, 0, 0));
        assert_eq!(w.month_end, dt(2026, 9, 1, 0, 0));
        assert_eq!(w.previous_month_start, dt(2026, 7, 1, 0, 0));
        assert_eq!(w.previous_month_end, dt(2026, 8, 1, 0, 0));
    }

    #[test]
    fn week_starts_on_monday() {
        // 2026-08-29 é um sábado; a segunda daquela semana é 24/08
        let w = ReportWindows::from_now(dt(2026, 8, 29, 10, 0));
        assert_eq!(w.week_start, dt(2026, 8, 24, 0, 0));
        assert_eq!(w.week_end, dt(2026, 8, 31, 0, 0));

        // Uma segunda-feira começa a própria semana
        let w = ReportWindows::from_now(dt(2026, 8, 24, 0, 0));
        assert_eq!(w.week_start, dt(2026, 8, 24, 0, 0));
    }

    #[test]
    fn month_windows_wrap_the_year() {
        // Janeiro: mês anterior é dezembro do ano passado
        let w = ReportWindows::from_now(dt(2026, 1, 15, 12, 0));
        assert_eq!(w.previous_month_start, dt(2025, 12, 1, 0, 0));
        assert_eq!(w.previous_month_end, dt(2026, 1, 1, 0, 0));

        // Dezembro: o fim do mês corrente cai no ano seguinte
        let w = ReportWindows::from_now(dt(2026, 12, 31, 23, 59));
        assert_eq!(w.month_end, dt(2027, 1, 1, 0, 0));
    }

    #[test]
    fn growth_is_zero_when_previous_month_had_no_revenue() {
        assert_eq!(sales_growth(Decimal::from(500), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(sales_growth(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn growth_is_a_percentage_over_the_previous_month() {
        assert_eq!(
            sales_growth(Decimal::from(150), Decimal::from(100)),
            Decimal::from(50)
        );
        assert_eq!(
            sales_growth(Decimal::from(50), Decimal::from(100)),
            Decimal::from(-50)
        );
    }

    #[test]
    fn chart_is_always_a_full_seven_point_series() {
        let entries = zero_filled_chart(date(2026, 8, 23), &[]);

        assert_eq!(entries.len(), 7);
        assert_eq!(entries[0].date, "23 Aug");
        assert_eq!(entries[6].date, "29 Aug");
        assert!(entries.iter().all(|e| e.sales.is_zero() && e.transactions == 0));
    }

    #[test]
    fn chart_places_days_with_data_in_the_right_slot() {
        let rows = vec![
            SalesChartRow {
                date: date(2026, 8, 24),
                total: Decimal::from(120),
                transactions: 3,
            },
            SalesChartRow {
                date: date(2026, 8, 29),
                total: Decimal::from(80),
                transactions: 1,
            },
        ];
        let entries = zero_filled_chart(date(2026, 8, 23), &rows);

        assert_eq!(entries.len(), 7);
        assert_eq!(entries[1].date, "24 Aug");
        assert_eq!(entries[1].sales, Decimal::from(120));
        assert_eq!(entries[1].transactions, 3);
        assert_eq!(entries[6].sales, Decimal::from(80));
        // Os demais dias ficam zerados
        assert!(entries[0].sales.is_zero());
        assert!(entries[2].sales.is_zero());
    }

    #[test]
    fn empty_dataset_yields_an_all_zero_report() {
        let windows = ReportWindows::from_now(dt(2026, 8, 29, 9, 0));
        let report = assemble_report(&windows, empty_rows());

        assert_eq!(report.today_sales, Decimal::ZERO);
        assert_eq!(report.today_transactions, 0);
        assert_eq!(report.total_products_sold, 0);
        assert_eq!(report.sales_growth, Decimal::ZERO);
        assert_eq!(report.total_customers, 0);
        assert!(report.recent_transactions.is_empty());
        assert!(report.best_selling_products.is_empty());
        assert_eq!(report.sales_chart_data.len(), 7);
    }

    #[test]
    fn todays_totals_come_straight_from_the_day_window() {
        // T1(100, hoje) + T2(50, hoje); T3(200, ontem) fica fora da janela
        let windows = ReportWindows::from_now(dt(2026, 8, 29, 18, 0));
        let mut rows = empty_rows();
        rows.today = TodayStatsRow { total: Decimal::from(150), count: 2 };

        let report = assemble_report(&windows, rows);
        assert_eq!(report.today_sales, Decimal::from(150));
        assert_eq!(report.today_transactions, 2);
    }

    #[test]
    fn best_sellers_carry_quantity_and_sales_sums() {
        // Produto P com itens (3, 30.00) e (2, 20.00) no mês corrente
        let windows = ReportWindows::from_now(dt(2026, 8, 29, 18, 0));
        let mut rows = empty_rows();
        rows.best_selling = vec![crate::models::dashboard::BestSellingRow {
            name: "P".to_string(),
            total_quantity: 5,
            total_sales: Decimal::from(50),
        }];

        let report = assemble_report(&windows, rows);
        assert_eq!(report.best_selling_products.len(), 1);
        assert_eq!(report.best_selling_products[0].name, "P");
        assert_eq!(report.best_selling_products[0].total_quantity, 5);
        assert_eq!(report.best_selling_products[0].total_sales, Decimal::from(50));
    }

    #[test]
    fn recent_transactions_keep_repository_order_and_fields() {
        let windows = ReportWindows::from_now(dt(2026, 8, 29, 18, 0));
        let newer = RecentTransactionRow {
            id: Uuid::new_v4(),
            total_amount: Decimal::from(80),
            items_count: 4,
            created_at: dt(2026, 8, 29, 12, 0),
            status: "completed".to_string(),
        };
        let older = RecentTransactionRow {
            id: Uuid::new_v4(),
            total_amount: Decimal::from(25),
            items_count: 1,
            created_at: dt(2026, 8, 28, 9, 0),
            status: "pending".to_string(),
        };
        let mut rows = empty_rows();
        rows.recent = vec![newer.clone(), older];

        let report = assemble_report(&windows, rows);
        assert_eq!(report.recent_transactions.len(), 2);
        assert_eq!(report.recent_transactions[0].id, newer.id);
        assert_eq!(report.recent_transactions[0].items_count, 4);
        assert_eq!(report.recent_transactions[0].status, "completed");
        assert!(
            report.recent_transactions[0].created_at > report.recent_transactions[1].created_at
        );
    }

    #[test]
    fn assembly_is_deterministic_for_a_fixed_now_and_rows() {
        let windows = ReportWindows::from_now(dt(2026, 8, 29, 18, 0));
        let mut rows = empty_rows();
        rows.monthly_revenue = Decimal::from(300);
        rows.previous_month_revenue = Decimal::from(200);
        rows.chart = vec![SalesChartRow {
            date: date(2026, 8, 27),
            total: Decimal::from(42),
            transactions: 2,
        }];

        let a = assemble_report(&windows, rows.clone());
        let b = assemble_report(&windows, rows);
        assert_eq!(a, b);
        assert_eq!(a.sales_growth, Decimal::from(50));
    }

    #[test]
    fn report_serializes_with_the_wire_field_names() {
        let windows = ReportWindows::from_now(dt(2026, 8, 29, 18, 0));
        let report = assemble_report(&windows, empty_rows());
        let json = serde_json::to_value(&report).unwrap();

        for key in [
            "today_sales",
            "today_transactions",
            "total_products_sold",
            "recent_transactions",
            "monthly_revenue",
            "weekly_revenue",
            "sales_growth",
            "total_customers",
            "best_selling_products",
            "sales_chart_data",
        ] {
            assert!(json.get(key).is_some(), "campo ausente: {key}");
        }
        // serde-float: dinheiro vai como número, não como string
        assert!(json["today_sales"].is_number());
    }
}
