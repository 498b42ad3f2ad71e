// src/models/dashboard.rs

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// O relatório completo do dashboard. É um snapshot calculado na hora,
// nunca persistido. Os nomes dos campos são o contrato do front-end
// (snake_case), então não usamos rename_all aqui.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardReport {
    pub today_sales: Decimal,
    pub today_transactions: i64,
    pub total_products_sold: i64,
    pub recent_transactions: Vec<RecentTransaction>,
    pub monthly_revenue: Decimal,
    pub weekly_revenue: Decimal,
    pub sales_growth: Decimal,
    pub total_customers: i64,
    pub best_selling_products: Vec<BestSellingProduct>,
    pub sales_chart_data: Vec<SalesChartEntry>,
}

// Um ponto do gráfico de vendas (7 dias). O rótulo segue o formato "29 Aug"
// que o gráfico do front-end espera.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SalesChartEntry {
    pub date: String,
    pub sales: Decimal,
    pub transactions: i64,
}

// Top 5 produtos do mês corrente
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BestSellingProduct {
    pub name: String,
    pub total_quantity: i64,
    pub total_sales: Decimal,
}

// As 5 vendas mais recentes
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecentTransaction {
    pub id: Uuid,
    pub total_amount: Decimal,
    pub items_count: i64,
    pub created_at: NaiveDateTime,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Linhas cruas vindas do repositório. O serviço monta o relatório a partir
// delas; só o serviço decide rótulos, zero-fill e crescimento.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct TodayStatsRow {
    pub total: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct SalesChartRow {
    pub date: NaiveDate,
    pub total: Decimal,
    pub transactions: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct BestSellingRow {
    pub name: String,
    pub total_quantity: i64,
    pub total_sales: Decimal,
}

#[derive(Debug, Clone, FromRow)]
pub struct RecentTransactionRow {
    pub id: Uuid,
    pub total_amount: Decimal,
    pub items_count: i64,
    pub created_at: NaiveDateTime,
    pub status: String,
}

// Tudo que o repositório lê em uma única transação de leitura
#[derive(Debug, Clone)]
pub struct DashboardRows {
    pub today: TodayStatsRow,
    pub products_sold_today: i64,
    pub chart: Vec<SalesChartRow>,
    pub monthly_revenue: Decimal,
    pub weekly_revenue: Decimal,
    pub previous_month_revenue: Decimal,
    pub total_customers: i64,
    pub best_selling: Vec<BestSellingRow>,
    pub recent: Vec<RecentTransactionRow>,
}

// Janelas de tempo do relatório, todas derivadas de um único `now` injetado
// pelo chamador. Intervalos semiabertos: [start, end).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportWindows {
    pub today_start: NaiveDateTime,
    pub today_end: NaiveDateTime,
    // 7 dias de calendário terminando hoje, inclusive
    pub chart_start: NaiveDateTime,
    pub chart_end: NaiveDateTime,
    // Semana começa na segunda-feira
    pub week_start: NaiveDateTime,
    pub week_end: NaiveDateTime,
    pub month_start: NaiveDateTime,
    pub month_end: NaiveDateTime,
    pub previous_month_start: NaiveDateTime,
    pub previous_month_end: NaiveDateTime,
}

impl ReportWindows {
    pub fn from_now(now: NaiveDateTime) -> Self {
        let today = now.date();
        let today_start = today.and_time(NaiveTime::MIN);
        let today_end = today_start + Duration::days(1);

        let week_start_day =
            today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
        let week_start = week_start_day.and_time(NaiveTime::MIN);

        let month_start = first_of_month(today.year(), today.month());
        let month_end = if today.month() == 12 {
            first_of_month(today.year() + 1, 1)
        } else {
            first_of_month(today.year(), today.month() + 1)
        };
        let previous_month_start = if today.month() == 1 {
            first_of_month(today.year() - 1, 12)
        } else {
            first_of_month(today.year(), today.month() - 1)
        };

        Self {
            today_start,
            today_end,
            chart_start: today_start - Duration::days(6),
            chart_end: today_end,
            week_start,
            week_end: week_start + Duration::days(7),
            month_start,
            month_end,
            previous_month_start,
            previous_month_end: month_start,
        }
    }

    // Primeiro dia de calendário coberto pelo gráfico de 7 pontos
    pub fn chart_first_day(&self) -> NaiveDate {
        self.chart_start.date()
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDateTime {
    // O dia 1 existe em qualquer mês válido
    NaiveDate::from_ymd_opt(year, month, 1)
        .expect("mês válido")
        .and_time(NaiveTime::MIN)
}
