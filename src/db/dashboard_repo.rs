// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::{
    common::error::AppError,
    models::dashboard::{
        BestSellingRow, DashboardRows, RecentTransactionRow, ReportWindows, SalesChartRow,
        TodayStatsRow,
    },
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Lê tudo que o relatório precisa em uma única transação de leitura
    // (snapshot consistente dos dados). As janelas chegam prontas do serviço:
    // nada aqui consulta o relógio nem o CURRENT_DATE do banco.
    pub async fn fetch_dashboard_rows(
        &self,
        windows: &ReportWindows,
    ) -> Result<DashboardRows, AppError> {
        let mut tx = self.pool.begin().await?;

        // A. Vendas e quantidade de transações de hoje
        let today = sqlx::query_as::<_, TodayStatsRow>(
            r#"
            SELECT COALESCE(SUM(total_amount), 0) AS total,
                   COUNT(*) AS count
            FROM transactions
            WHERE created_at >= $1 AND created_at < $2
            "#,
        )
        .bind(windows.today_start)
        .bind(windows.today_end)
        .fetch_one(&mut *tx)
        .await?;

        // B. Produtos vendidos hoje (soma das quantidades dos itens,
        // filtrando pela data da transação-pai)
        let products_sold_today = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(ti.quantity), 0)
            FROM transaction_items ti
            JOIN transactions t ON t.id = ti.transaction_id
            WHERE t.created_at >= $1 AND t.created_at < $2
            "#,
        )
        .bind(windows.today_start)
        .bind(windows.today_end)
        .fetch_one(&mut *tx)
        .await?;

        // C. Vendas por dia dos últimos 7 dias (só dias com dados; o
        // zero-fill é responsabilidade do serviço)
        let chart = sqlx::query_as::<_, SalesChartRow>(
            r#"
            SELECT created_at::date AS date,
                   SUM(total_amount) AS total,
                   COUNT(*) AS transactions
            FROM transactions
            WHERE created_at >= $1 AND created_at < $2
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
        )
        .bind(windows.chart_start)
        .bind(windows.chart_end)
        .fetch_all(&mut *tx)
        .await?;

        // D. Receitas do mês, da semana e do mês anterior
        let monthly_revenue =
            revenue_between(&mut *tx, windows.month_start, windows.month_end).await?;
        let weekly_revenue =
            revenue_between(&mut *tx, windows.week_start, windows.week_end).await?;
        let previous_month_revenue =
            revenue_between(&mut *tx, windows.previous_month_start, windows.previous_month_end)
                .await?;

        // E. Clientes distintos (todo o histórico, sem janela de data)
        let total_customers = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT user_id)
            FROM transactions
            WHERE user_id IS NOT NULL
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // F. Top 5 produtos do mês corrente. Atenção: o filtro é pelo
        // created_at do ITEM, não da transação-pai.
        let best_selling = sqlx::query_as::<_, BestSellingRow>(
            r#"
            SELECT p.name,
                   SUM(ti.quantity) AS total_quantity,
                   SUM(ti.subtotal) AS total_sales
            FROM transaction_items ti
            JOIN products p ON p.id = ti.product_id
            WHERE ti.created_at >= $1 AND ti.created_at < $2
            GROUP BY p.id, p.name
            ORDER BY total_quantity DESC
            LIMIT 5
            "#,
        )
        .bind(windows.month_start)
        .bind(windows.month_end)
        .fetch_all(&mut *tx)
        .await?;

        // G. As 5 vendas mais recentes, com a contagem de itens de cada uma
        let recent = sqlx::query_as::<_, RecentTransactionRow>(
            r#"
            SELECT t.id,
                   t.total_amount,
                   COALESCE(SUM(ti.quantity), 0) AS items_count,
                   t.created_at,
                   t.status
            FROM transactions t
            LEFT JOIN transaction_items ti ON ti.transaction_id = t.id
            GROUP BY t.id
            ORDER BY t.created_at DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        // Leitura pura: commit ou rollback tanto faz, mas commit é clean
        tx.commit().await?;

        Ok(DashboardRows {
            today,
            products_sold_today,
            chart,
            monthly_revenue,
            weekly_revenue,
            previous_month_revenue,
            total_customers,
            best_selling,
            recent,
        })
    }
}

// Soma de total_amount das transações criadas em [start, end)
async fn revenue_between(
    conn: &mut PgConnection,
    start: chrono::NaiveDateTime,
    end: chrono::NaiveDateTime,
) -> Result<Decimal, AppError> {
    let total = sqlx::query_scalar::<_, Decimal>(
        r#"
        SELECT COALESCE(SUM(total_amount), 0)
        FROM transactions
        WHERE created_at >= $1 AND created_at < $2
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_one(conn)
    .await?;

    Ok(total)
}
