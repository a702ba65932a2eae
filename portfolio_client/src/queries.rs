// GraphQL documents sent to the Grafbase endpoint.

pub const GET_USER_QUERY: &str = r#"
query GetUser($email: String!) {
  user(by: { email: $email }) {
    id
    name
    email
    avatarUrl
    description
    githubUrl
    linkedIn
  }
}
"#;

pub const CREATE_USER_MUTATION: &str = r#"
mutation CreateUser($input: UserCreateInput!) {
  userCreate(input: $input) {
    user {
      id
      name
      email
      avatarUrl
      description
      githubUrl
      linkedIn
    }
  }
}
"#;

pub const PROJECTS_QUERY: &str = r#"
query GetProjects($category: String, $endCursor: String) {
  projectSearch(first: 8, after: $endCursor, filter: { category: { eq: $category } }) {
    pageInfo {
      hasPreviousPage
      hasNextPage
      startCursor
      endCursor
    }
    edges {
      node {
        id
        title
        description
        image
        liveSiteUrl
        githubUrl
        category
        createdBy {
          id
          name
          email
          avatarUrl
        }
      }
    }
  }
}
"#;

pub const GET_PROJECT_BY_ID_QUERY: &str = r#"
query GetProjectById($id: ID!) {
  project(by: { id: $id }) {
    id
    title
    description
    image
    liveSiteUrl
    githubUrl
    category
    createdBy {
      id
      name
      email
      avatarUrl
    }
  }
}
"#;

pub const GET_PROJECTS_OF_USER_QUERY: &str = r#"
query GetUserProjects($id: ID!, $last: Int = 4) {
  user(by: { id: $id }) {
    id
    name
    email
    avatarUrl
    description
    githubUrl
    linkedIn
    projects(last: $last) {
      edges {
        node {
          id
          title
          image
        }
      }
    }
  }
}
"#;

pub const CREATE_PROJECT_MUTATION: &str = r#"
mutation CreateProject($input: ProjectCreateInput!) {
  projectCreate(input: $input) {
    project {
      id
      title
      description
      image
      liveSiteUrl
      githubUrl
      category
      createdBy {
        id
        name
        email
        avatarUrl
      }
    }
  }
}
"#;

pub const UPDATE_PROJECT_MUTATION: &str = r#"
mutation UpdateProject($id: ID!, $input: ProjectUpdateInput!) {
  projectUpdate(by: { id: $id }, input: $input) {
    project {
      id
      title
      description
      image
      liveSiteUrl
      githubUrl
      category
      createdBy {
        id
        name
        email
        avatarUrl
      }
    }
  }
}
"#;

pub const DELETE_PROJECT_MUTATION: &str = r#"
mutation DeleteProject($id: ID!) {
  projectDelete(by: { id: $id }) {
    deletedId
  }
}
"#;
