//! Customer tools, including account invitations.

use serde_json::{Value, json};
use shopify_admin_mcp_core::{ParamSpec, ResourceKind, ToolDefinition, to_gid};
use tracing::instrument;

use crate::error::ToolError;
use crate::shopify::{AdminClient, mutation_payload, required_node};

use super::{Arguments, ToolRegistry, after_param, first_param, query_param};

const CUSTOMER_SORT_KEYS: &[&str] = &[
    "CREATED_AT",
    "ID",
    "LOCATION",
    "NAME",
    "RELEVANCE",
    "UPDATED_AT",
];

const LIST_CUSTOMERS: &str = r"
query ListCustomers($first: Int!, $after: String, $query: String, $sortKey: CustomerSortKeys) {
  customers(first: $first, after: $after, query: $query, sortKey: $sortKey) {
    nodes {
      id
      firstName
      lastName
      email
      state
      numberOfOrders
      amountSpent {
        amount
        currencyCode
      }
      tags
      createdAt
      updatedAt
      defaultAddress {
        city
        province
        country
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}";

const GET_CUSTOMER: &str = r"
query GetCustomer($id: ID!) {
  customer(id: $id) {
    id
    firstName
    lastName
    email
    phone
    state
    note
    verifiedEmail
    numberOfOrders
    amountSpent {
      amount
      currencyCode
    }
    tags
    createdAt
    updatedAt
    defaultAddress {
      address1
      address2
      city
      province
      zip
      country
    }
  }
}";

const COUNT_CUSTOMERS: &str = r"
query CountCustomers($query: String, $limit: Int) {
  customersCount(query: $query, limit: $limit) {
    count
    precision
  }
}";

const SEND_CUSTOMER_INVITE: &str = r"
mutation CustomerSendAccountInviteEmail($customerId: ID!) {
  customerSendAccountInviteEmail(customerId: $customerId) {
    customer {
      id
      email
      state
    }
    userErrors {
      field
      message
    }
  }
}";

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    registry.register(list_customers_tool(), handler!(list_customers))?;
    registry.register(get_customer_tool(), handler!(get_customer))?;
    registry.register(count_customers_tool(), handler!(count_customers))?;
    registry.register(send_customer_invite_tool(), handler!(send_customer_invite))?;
    Ok(())
}

fn customer_id_param() -> ParamSpec {
    ParamSpec::id("customerId")
        .required()
        .non_empty()
        .describe("Customer ID (numeric or gid://shopify/Customer/...)")
}

fn list_customers_tool() -> ToolDefinition {
    ToolDefinition::new(
        "listCustomers",
        "List customers with order counts, amount spent and default address.",
    )
    .param(first_param(10))
    .param(after_param())
    .param(query_param("'email:jane@example.com', 'country:Canada'"))
    .param(ParamSpec::string("sortKey").one_of(CUSTOMER_SORT_KEYS))
}

fn get_customer_tool() -> ToolDefinition {
    ToolDefinition::new("getCustomer", "Get a single customer by ID.").param(customer_id_param())
}

fn count_customers_tool() -> ToolDefinition {
    ToolDefinition::new("countCustomers", "Count customers, optionally filtered.")
        .param(query_param("'state:ENABLED'"))
        .param(
            ParamSpec::integer("limit")
                .positive()
                .describe("Stop counting at this value"),
        )
}

fn send_customer_invite_tool() -> ToolDefinition {
    ToolDefinition::new(
        "sendCustomerInvite",
        "Email a customer an invitation to create their store account.",
    )
    .param(customer_id_param())
}

#[instrument(skip_all)]
async fn list_customers(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let variables = json!({
        "first": args.i64_or("first", 10),
        "after": args.get("after"),
        "query": args.get("query"),
        "sortKey": args.get("sortKey"),
    });
    Ok(client
        .graphql(LIST_CUSTOMERS, "ListCustomers", variables)
        .await?)
}

#[instrument(skip_all)]
async fn get_customer(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let id = to_gid(ResourceKind::Customer, &args.id("customerId")?);
    let data = client
        .graphql(GET_CUSTOMER, "GetCustomer", json!({ "id": id }))
        .await?;
    Ok(required_node(data, "customer", &id)?)
}

#[instrument(skip_all)]
async fn count_customers(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let variables = json!({ "query": args.get("query"), "limit": args.get("limit") });
    Ok(client
        .graphql(COUNT_CUSTOMERS, "CountCustomers", variables)
        .await?)
}

#[instrument(skip_all)]
async fn send_customer_invite(client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
    let variables = json!({
        "customerId": to_gid(ResourceKind::Customer, &args.id("customerId")?),
    });
    let data = client
        .graphql(
            SEND_CUSTOMER_INVITE,
            "CustomerSendAccountInviteEmail",
            variables,
        )
        .await?;
    Ok(mutation_payload(data, "customerSendAccountInviteEmail")?)
}
