// Prompt constants for document generation.
// Templates are filled in one pass by `provider::fill_template`; placeholders are `{name}`.

/// System framing for resumes. Fixed; never varies per request.
pub const RESUME_SYSTEM: &str = "You are a professional resume writer with 10+ years of \
    experience. Create ATS-friendly, impactful resumes that highlight candidates' strengths. \
    Use only facts present in the candidate profile.";

/// System framing for cover letters.
pub const COVER_LETTER_SYSTEM: &str = "You are an expert cover letter writer. Create \
    compelling, personalized cover letters that showcase the candidate's fit for the role. \
    Use only facts present in the candidate profile.";

/// Resume prompt. Placeholders: {profile_json}, {job_description}, {custom_sections}
pub const RESUME_PROMPT_TEMPLATE: &str = r#"Generate a professional, ATS-friendly resume based on the following candidate profile and job description.

CANDIDATE PROFILE:
{profile_json}

JOB DESCRIPTION:
{job_description}

REQUIREMENTS:
1. Create a strong professional summary (3-4 sentences) that highlights key qualifications
2. List relevant work experience with bullet points focusing on achievements and impact
3. Include education and relevant skills
4. Use action verbs and quantify achievements where the profile supports it
5. Tailor the content to match the job requirements
6. Keep it concise and professional
7. Format in clean, readable sections{custom_sections}

Return the resume in JSON format with the following structure:
{
  "summary": "Professional summary paragraph",
  "experience": [
    {
      "company": "Company Name",
      "position": "Job Title",
      "period": "Start - End",
      "highlights": ["Achievement 1", "Achievement 2", "Achievement 3"]
    }
  ],
  "education": [
    {
      "institution": "School Name",
      "degree": "Degree",
      "period": "Start - End"
    }
  ],
  "skills": {
    "technical": ["skill1", "skill2"],
    "soft": ["skill1", "skill2"]
  }
}"#;

/// Cover letter prompt. Placeholders: {profile_json}, {job_description}, {company_name}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Generate a compelling cover letter based on the candidate profile and job description.

CANDIDATE PROFILE:
{profile_json}

JOB DESCRIPTION:
{job_description}

COMPANY NAME: {company_name}

REQUIREMENTS:
1. Start with a strong opening that shows enthusiasm and fit
2. Highlight 2-3 key qualifications that match the job requirements
3. Show understanding of the company/role
4. Demonstrate value the candidate brings
5. Close with a call to action
6. Keep it to 3-4 paragraphs
7. Professional but engaging tone

Return the cover letter in JSON format:
{
  "opening": "Opening paragraph",
  "body1": "First body paragraph",
  "body2": "Second body paragraph (if needed)",
  "closing": "Closing paragraph"
}"#;

/// Used in place of a company name the caller did not supply.
pub const UNKNOWN_COMPANY: &str = "Not specified";
